use crate::domain::entities::Method;

/// One positional command-line token, classified by its shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestItem {
    /// `:8080/api` or `/api`, appended to the base URL
    BaseUrlSuffix(String),
    Method(Method),
    Url(String),
    /// `key?=value`
    Query(String, String),
    /// `key=value`
    Field(String, String),
    /// `key:value`
    Header(String, String),
    Ignored(String),
}

impl RequestItem {
    /// Classifies a token; the first matching rule wins.
    pub fn classify(token: &str) -> Self {
        if token.is_empty() {
            return RequestItem::Ignored(String::new());
        }

        if token.starts_with(':') || token.starts_with('/') {
            return RequestItem::BaseUrlSuffix(token.to_string());
        }

        // flags are consumed by clap; anything left here came after `--`
        if token.starts_with('-') {
            return RequestItem::Ignored(token.to_string());
        }

        if let Ok(method) = token.parse::<Method>() {
            return RequestItem::Method(method);
        }

        if token.starts_with("http://") || token.starts_with("https://") {
            return RequestItem::Url(token.to_string());
        }

        if let Some((key, value)) = token.split_once("?=") {
            if !key.contains('=') && !key.contains(':') {
                return RequestItem::Query(key.to_string(), value.to_string());
            }
        }

        if let Some((key, value)) = token.split_once('=') {
            if !key.contains(':') {
                return RequestItem::Field(key.to_string(), value.to_string());
            }
        }

        if let Some((key, value)) = token.split_once(':') {
            if looks_like_port(value) {
                return RequestItem::Url(token.to_string());
            }
            return RequestItem::Header(key.trim().to_string(), value.trim().to_string());
        }

        RequestItem::Url(token.to_string())
    }
}

/// `8080` or `8080/path`: the digits before any slash form a plausible port
fn looks_like_port(value: &str) -> bool {
    let port = value.split('/').next().unwrap_or_default();
    (1..=5).contains(&port.len()) && port.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(key: &str, value: &str) -> (String, String) {
        (key.to_string(), value.to_string())
    }

    #[test]
    fn shorthand_targets_the_base_url() {
        assert_eq!(
            RequestItem::classify(":8080/api/"),
            RequestItem::BaseUrlSuffix(":8080/api/".into())
        );
        assert_eq!(
            RequestItem::classify("/api/"),
            RequestItem::BaseUrlSuffix("/api/".into())
        );
    }

    #[test]
    fn method_keywords_in_any_case() {
        assert_eq!(RequestItem::classify("post"), RequestItem::Method(Method::Post));
        assert_eq!(RequestItem::classify("DELETE"), RequestItem::Method(Method::Delete));
        assert_eq!(RequestItem::classify("options"), RequestItem::Method(Method::Options));
    }

    #[test]
    fn absolute_urls_win_over_header_syntax() {
        assert_eq!(
            RequestItem::classify("https://api.github.com/"),
            RequestItem::Url("https://api.github.com/".into())
        );
        assert_eq!(
            RequestItem::classify("http://example.com/?a=b"),
            RequestItem::Url("http://example.com/?a=b".into())
        );
    }

    #[test]
    fn query_fields_and_headers() {
        let RequestItem::Query(k, v) = RequestItem::classify("name?=likexian") else {
            panic!("expected a query item");
        };
        assert_eq!(pair(&k, &v), pair("name", "likexian"));

        assert_eq!(
            RequestItem::classify("name=likexian"),
            RequestItem::Field("name".into(), "likexian".into())
        );
        assert_eq!(
            RequestItem::classify("User-Agent:HAT/0.1.0"),
            RequestItem::Header("User-Agent".into(), "HAT/0.1.0".into())
        );
    }

    #[test]
    fn only_the_first_separator_splits() {
        assert_eq!(
            RequestItem::classify("expr=a=b"),
            RequestItem::Field("expr".into(), "a=b".into())
        );
        assert_eq!(
            RequestItem::classify("q?=x?=y"),
            RequestItem::Query("q".into(), "x?=y".into())
        );
        assert_eq!(
            RequestItem::classify("Authorization: Bearer a:b"),
            RequestItem::Header("Authorization".into(), "Bearer a:b".into())
        );
    }

    #[test]
    fn separators_inside_keys_fall_through_to_later_rules() {
        // `=` in the key disqualifies the query reading
        assert_eq!(
            RequestItem::classify("a=b?=c"),
            RequestItem::Field("a".into(), "b?=c".into())
        );
        // `:` in the key disqualifies both query and field readings
        assert_eq!(
            RequestItem::classify("X-Filter:a=b"),
            RequestItem::Header("X-Filter".into(), "a=b".into())
        );
    }

    #[test]
    fn host_with_port_is_a_url() {
        assert_eq!(
            RequestItem::classify("localhost:8080"),
            RequestItem::Url("localhost:8080".into())
        );
        assert_eq!(
            RequestItem::classify("localhost:8080/api"),
            RequestItem::Url("localhost:8080/api".into())
        );
        assert_eq!(
            RequestItem::classify("X-Retry:123456"),
            RequestItem::Header("X-Retry".into(), "123456".into())
        );
    }

    #[test]
    fn bare_words_are_urls_and_dashes_are_ignored() {
        assert_eq!(
            RequestItem::classify("example.com"),
            RequestItem::Url("example.com".into())
        );
        assert_eq!(
            RequestItem::classify("--unknown"),
            RequestItem::Ignored("--unknown".into())
        );
        assert_eq!(RequestItem::classify(""), RequestItem::Ignored(String::new()));
    }
}
