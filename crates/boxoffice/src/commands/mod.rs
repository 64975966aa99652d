mod events;
mod purchase;

use boxoffice_operations::BoxofficeConfig;
use clap::Subcommand;

use crate::error::Result;

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Buy tickets for an event through the purchase saga
    Purchase(purchase::PurchaseArgs),
    /// List configured events and their remaining capacity
    Events,
}

impl Commands {
    pub(crate) fn execute(self, config: BoxofficeConfig) -> Result<()> {
        match self {
            Self::Purchase(args) => purchase::run(args, config),
            Self::Events => {
                events::run(&config);
                Ok(())
            }
        }
    }
}
