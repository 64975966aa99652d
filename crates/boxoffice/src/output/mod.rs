mod plain;

pub(crate) use plain::PlainTextFormatter;
