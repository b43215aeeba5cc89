use crate::{Keyblock, Kvno, Principal, Timestamp};

const REALM_SEP: char = '@';
const COMPONENT_SEP: char = '/';

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeytabEntry {
    pub principal: KeytabPrincipal,
    pub timestamp: Timestamp,
    pub vno: Kvno,
    pub key: Keyblock,
}

/// A principal as stored in a keytab record: realm plus ordered name components.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeytabPrincipal {
    pub realm: String,
    pub components: Vec<String>,
    pub name_type: NameType,
}

impl KeytabPrincipal {
    /// Renders every name component, unlike [`Principal::full`] which keeps two.
    pub fn unparse_name(&self) -> String {
        let mut name = self.components.join(&COMPONENT_SEP.to_string());
        name.push(REALM_SEP);
        name.push_str(&self.realm);
        name
    }
}

impl From<&Principal> for KeytabPrincipal {
    fn from(principal: &Principal) -> Self {
        let mut components = vec![principal.primary.clone()];
        if !principal.instance.is_empty() {
            components.push(principal.instance.clone());
        }
        Self {
            realm: principal.realm.clone(),
            components,
            name_type: NameType::PRINCIPAL,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NameType(pub i32);

macro_rules! name_type {
    ($name_type:ident, $int:expr) => {
        pub const $name_type: NameType = NameType($int);
    };
}

impl NameType {
    // Name type not known
    name_type!(UNKNOWN, 0);
    // Just the name of the principal as in DCE, or for users
    name_type!(PRINCIPAL, 1);
}
