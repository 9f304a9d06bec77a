use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

macro_rules! numeric_id {
    ($name:ident) => {
        #[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            pub const fn new(raw: i64) -> Self {
                Self(raw)
            }

            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(raw: i64) -> Self {
                Self(raw)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIntError;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse().map(Self)
            }
        }
    };
}

numeric_id!(UserId);
numeric_id!(ArticleId);

/// Identity of one cart line: at most one stored order exists per key.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct OrderKey {
    pub user: UserId,
    pub article: ArticleId,
}

impl OrderKey {
    pub fn new(user: impl Into<UserId>, article: impl Into<ArticleId>) -> Self {
        Self {
            user: user.into(),
            article: article.into(),
        }
    }
}

impl fmt::Display for OrderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.user, self.article)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_wrap_raw_values() {
        assert_eq!(UserId::new(7).get(), 7);
        assert_eq!(ArticleId::from(42).get(), 42);
    }

    #[test]
    fn parse_trims_whitespace() {
        let id: UserId = " 12 ".parse().unwrap();
        assert_eq!(id, UserId::new(12));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!("abc".parse::<ArticleId>().is_err());
        assert!("".parse::<ArticleId>().is_err());
    }

    #[test]
    fn key_display() {
        let key = OrderKey::new(3, 9);
        assert_eq!(key.to_string(), "3:9");
    }

    #[test]
    fn keys_order_by_user_then_article() {
        let mut keys = vec![OrderKey::new(2, 1), OrderKey::new(1, 3), OrderKey::new(1, 2)];
        keys.sort();
        assert_eq!(
            keys,
            vec![OrderKey::new(1, 2), OrderKey::new(1, 3), OrderKey::new(2, 1)]
        );
    }

    #[test]
    fn ids_serialize_as_plain_integers() {
        let json = serde_json::to_string(&OrderKey::new(1, 5)).unwrap();
        assert_eq!(json, r#"{"user":1,"article":5}"#);
    }
}
