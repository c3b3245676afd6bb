use itertools::Itertools;
use std::collections::HashSet;

/// What the workers pull out of each page. Chosen once per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrapeMode {
    PhoneNumbers,
    Urls,
}

impl ScrapeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScrapeMode::PhoneNumbers => "phone_numbers",
            ScrapeMode::Urls => "urls",
        }
    }
}

/// A fetched page and the data scraped from it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScrapedRecord {
    pub url: String,
    pub phone_numbers: HashSet<String>,
    pub urls: HashSet<String>,
}

impl ScrapedRecord {
    /// Output lines for this record.
    ///
    /// Phone mode always yields one `url, numbers` line, even with no
    /// numbers. URL mode yields one line per discovered URL and nothing else.
    pub fn render(&self, mode: ScrapeMode) -> String {
        match mode {
            ScrapeMode::PhoneNumbers => format!(
                "{}, {}\n",
                self.url,
                self.phone_numbers.iter().sorted().join(", ")
            ),
            ScrapeMode::Urls => self
                .urls
                .iter()
                .sorted()
                .map(|url| format!("{}\n", url))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn record() -> ScrapedRecord {
        ScrapedRecord {
            url: "https://example.com".to_string(),
            phone_numbers: ["(646) 555-0100", "(212) 555-0199"]
                .iter()
                .map(ToString::to_string)
                .collect(),
            urls: ["https://b.example.com/", "https://a.example.com/"]
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }

    #[test]
    fn test_render_phone_numbers() {
        assert_eq!(
            record().render(ScrapeMode::PhoneNumbers),
            "https://example.com, (212) 555-0199, (646) 555-0100\n"
        );
    }

    #[test]
    fn test_render_phone_numbers_empty() {
        let record = ScrapedRecord {
            url: "https://example.com".to_string(),
            ..Default::default()
        };
        assert_eq!(
            record.render(ScrapeMode::PhoneNumbers),
            "https://example.com, \n"
        );
    }

    #[test]
    fn test_render_urls() {
        assert_eq!(
            record().render(ScrapeMode::Urls),
            "https://a.example.com/\nhttps://b.example.com/\n"
        );

        let empty = ScrapedRecord::default();
        assert_eq!(empty.render(ScrapeMode::Urls), "");
    }
}
