use crate::{error::KRB5_PARSE_MALFORMED, KeytabPrincipal};
use serde::Serialize;
use std::{cmp::Ordering, fmt, hash, str::FromStr};

const REALM_SEP: char = '@';
const COMPONENT_SEP: char = '/';

/// A Kerberos principal in `primary[/instance]@realm` form.
///
/// Identity is the canonical string returned by [`Principal::full`]: two
/// principals are equal, ordered and hashed by that string alone.
#[derive(Debug, Clone, Serialize)]
pub struct Principal {
    pub primary: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub instance: String,
    pub realm: String,
}

impl Principal {
    pub fn new(primary: &str, instance: Option<&str>, realm: &str) -> Self {
        Self {
            primary: primary.to_owned(),
            instance: instance.unwrap_or_default().to_owned(),
            realm: realm.to_owned(),
        }
    }

    pub fn full(&self) -> String {
        if self.instance.is_empty() {
            format!("{}{}{}", self.primary, REALM_SEP, self.realm)
        } else {
            format!(
                "{}{}{}{}{}",
                self.primary, COMPONENT_SEP, self.instance, REALM_SEP, self.realm
            )
        }
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full())
    }
}

impl PartialEq for Principal {
    fn eq(&self, other: &Self) -> bool {
        self.full() == other.full()
    }
}

impl Eq for Principal {}

impl PartialOrd for Principal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Principal {
    fn cmp(&self, other: &Self) -> Ordering {
        self.full().cmp(&other.full())
    }
}

impl hash::Hash for Principal {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        self.full().hash(state)
    }
}

// Only the first two name components take part in the identity.
impl From<&KeytabPrincipal> for Principal {
    fn from(principal: &KeytabPrincipal) -> Self {
        let mut components = principal.components.iter();
        Self {
            primary: components.next().cloned().unwrap_or_default(),
            instance: components.next().cloned().unwrap_or_default(),
            realm: principal.realm.clone(),
        }
    }
}

impl FromStr for Principal {
    type Err = anyhow::Error;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let (components, realm) = match name.rsplit_once(REALM_SEP) {
            Some((components, realm)) if !realm.is_empty() => (components, realm),
            _ => Err(*KRB5_PARSE_MALFORMED)?,
        };
        if components.contains(REALM_SEP) || realm.contains(COMPONENT_SEP) {
            Err(*KRB5_PARSE_MALFORMED)?
        }
        let (primary, instance) = match components.split_once(COMPONENT_SEP) {
            Some((_, instance)) if instance.is_empty() || instance.contains(COMPONENT_SEP) => {
                Err(*KRB5_PARSE_MALFORMED)?
            }
            Some((primary, instance)) => (primary, Some(instance)),
            None => (components, None),
        };
        if primary.is_empty() {
            Err(*KRB5_PARSE_MALFORMED)?
        }
        Ok(Self::new(primary, instance, realm))
    }
}
