use boxoffice_operations::BoxofficeConfig;

use crate::output::PlainTextFormatter;

pub(crate) fn run(config: &BoxofficeConfig) {
    print!("{}", PlainTextFormatter::format_events(&config.events));
}
