use std::collections::{BTreeMap, BTreeSet};

use serde::Deserialize;

/// Where to reach an authority's operator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    pub address: String,
    /// Blind copy rather than a visible one
    pub bcc: bool,
}

/// Contact information of the authority operators
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ContactBook {
    #[serde(default)]
    contact_address: BTreeMap<String, String>,
    #[serde(default)]
    contact_via_bcc: BTreeSet<String>,
}

impl ContactBook {
    pub fn new(
        addresses: impl IntoIterator<Item = (String, String)>,
        via_bcc: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            contact_address: addresses.into_iter().collect(),
            contact_via_bcc: via_bcc.into_iter().collect(),
        }
    }

    /// `None` if we have no contact information for this authority
    pub fn destination(&self, authority: &str) -> Option<Destination> {
        self.contact_address
            .get(authority)
            .map(|address| Destination {
                address: address.clone(),
                bcc: self.contact_via_bcc.contains(authority),
            })
    }

    /// Add the entries of `other`, which take precedence
    pub fn extend(&mut self, other: ContactBook) {
        self.contact_address.extend(other.contact_address);
        self.contact_via_bcc.extend(other.contact_via_bcc);
    }

    pub fn is_empty(&self) -> bool {
        self.contact_address.is_empty()
    }
}
