//! Printing the resolved configuration

use crate::config::Config;
use std::io::{self, Write};

pub fn print_config_values(out: &mut impl Write, cfg: &Config) -> io::Result<()> {
    writeln!(out, "pushfrequency: {}", cfg.client.push_frequency)?;
    writeln!(out, "toggle: {}", cfg.toggle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Interval;

    #[test]
    fn test_prints_one_line_per_value() {
        let mut cfg = Config::default();
        cfg.client.push_frequency = Interval::from_secs(30);

        let mut out = Vec::new();
        print_config_values(&mut out, &cfg).expect("print");
        assert_eq!(String::from_utf8(out).expect("utf8"), "pushfrequency: 30s\ntoggle: false\n");
    }
}
