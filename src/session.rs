use chrono::{DateTime, TimeZone, Utc};

/// Moderator session state.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum Session {
    /// Anonymous visitor.
    #[default]
    Unauthenticated,

    /// A signed-in moderator holding a bearer token.
    Authenticated {
        token: String,
        expiry: DateTime<Utc>,
    },
}

impl Session {
    /// Whether the session grants moderator access right now.
    pub fn is_active(&self) -> bool {
        match self {
            Session::Unauthenticated => false,
            Session::Authenticated { expiry, .. } => *expiry > Utc::now(),
        }
    }

    /// The bearer token, if authenticated.
    pub fn token(&self) -> Option<&str> {
        match self {
            Session::Unauthenticated => None,
            Session::Authenticated { token, .. } => Some(token.as_str()),
        }
    }

    /// Encode the session for the session cookie as `<expiry unix>.<token>`.
    ///
    /// Returns `None` for an unauthenticated session.
    pub fn to_cookie_value(&self) -> Option<String> {
        match self {
            Session::Unauthenticated => None,
            Session::Authenticated { token, expiry } => {
                Some(format!("{}.{}", expiry.timestamp(), token))
            }
        }
    }

    /// Decode a cookie value written by [`Session::to_cookie_value`].
    ///
    /// Anything malformed decodes to `Unauthenticated`.
    pub fn from_cookie_value(value: &str) -> Session {
        let Some((expiry, token)) = value.split_once('.') else {
            return Session::Unauthenticated;
        };
        let Ok(expiry) = expiry.parse::<i64>() else {
            return Session::Unauthenticated;
        };
        let Some(expiry) = Utc.timestamp_opt(expiry, 0).single() else {
            return Session::Unauthenticated;
        };
        if token.is_empty() {
            return Session::Unauthenticated;
        }

        Session::Authenticated {
            token: token.to_owned(),
            expiry,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    #[test]
    fn cookie_value_keeps_dotted_tokens() {
        let expiry = Utc.timestamp_opt(1_900_000_000, 0).unwrap();
        let session = Session::Authenticated {
            token: "header.payload.signature".to_owned(),
            expiry,
        };

        let cookie = session.to_cookie_value().unwrap();
        assert_eq!(cookie, "1900000000.header.payload.signature");
        assert_eq!(Session::from_cookie_value(&cookie), session);
    }

    #[test]
    fn garbage_cookie_is_unauthenticated() {
        assert_eq!(Session::from_cookie_value(""), Session::Unauthenticated);
        assert_eq!(Session::from_cookie_value("abc.def"), Session::Unauthenticated);
        assert_eq!(Session::from_cookie_value("123."), Session::Unauthenticated);
        assert_eq!(Session::Unauthenticated.to_cookie_value(), None);
    }

    #[test]
    fn expired_session_is_inactive() {
        let expired = Session::Authenticated {
            token: "t".to_owned(),
            expiry: Utc::now() - Duration::minutes(1),
        };
        let live = Session::Authenticated {
            token: "t".to_owned(),
            expiry: Utc::now() + Duration::hours(1),
        };

        assert!(!expired.is_active());
        assert!(live.is_active());
        assert!(!Session::Unauthenticated.is_active());
    }
}
