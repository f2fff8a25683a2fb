//! Line signatures and the per-cart signature cache
//!
//! A signature is the canonical identity of a purchasable configuration:
//! two paid lines with equal signatures are the same thing and must be
//! merged instead of coexisting.

use dashmap::DashMap;
use shared::cart::{CartLine, CustomizationSelection, ExpandableSelection, LineKind};
use std::collections::HashMap;

const DELIMITER: &str = "|";
const NO_COMPONENT: &str = "none";

/// Canonical signature for a line configuration.
///
/// Format: the item token ("Product-7" / "Deal-3"), the sorted set of
/// `{deal_product|none}:{choice}` customization tokens, then the sorted
/// set of expandable tokens, all joined with "|". Selection order never
/// changes the result.
pub fn line_signature(
    kind: &LineKind,
    customizations: &[CustomizationSelection],
    extras: &[ExpandableSelection],
) -> String {
    let mut parts = vec![kind.signature_token()];

    let mut custom_tokens: Vec<String> = customizations
        .iter()
        .map(|c| {
            format!(
                "{}:{}",
                c.deal_product_id.as_deref().unwrap_or(NO_COMPONENT),
                c.choice_id
            )
        })
        .collect();
    custom_tokens.sort();
    parts.extend(custom_tokens);

    let mut extra_tokens: Vec<String> = extras
        .iter()
        .map(|e| {
            format!(
                "{}:{}",
                e.deal_product_id.as_deref().unwrap_or(NO_COMPONENT),
                e.choice_id
            )
        })
        .collect();
    extra_tokens.sort();
    parts.extend(extra_tokens);

    parts.join(DELIMITER)
}

/// Signature of an existing cart line
pub fn signature_of(line: &CartLine) -> String {
    line_signature(&line.kind, &line.customizations, &line.extras)
}

/// Write-through signature cache, keyed by cart id.
///
/// The cache is a lookup hint only: merge decisions re-verify signatures
/// against the persisted lines inside the write transaction, and the
/// entry is rebuilt from the committed state after every mutation.
#[derive(Debug, Default)]
pub struct SignatureCache {
    entries: DashMap<String, HashMap<String, String>>,
}

impl SignatureCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hint: the line id last committed under this signature
    pub fn lookup(&self, cart_id: &str, signature: &str) -> Option<String> {
        self.entries
            .get(cart_id)
            .and_then(|sigs| sigs.get(signature).cloned())
    }

    /// Replace the cart's entry with the signatures of its committed
    /// paid lines (free lines never participate in merging)
    pub fn store(&self, cart_id: &str, lines: &[CartLine]) {
        let sigs: HashMap<String, String> = lines
            .iter()
            .filter(|line| !line.is_free)
            .map(|line| (signature_of(line), line.line_id.clone()))
            .collect();
        self.entries.insert(cart_id.to_string(), sigs);
    }

    /// Drop the cart's entry (cart deleted)
    pub fn invalidate(&self, cart_id: &str) {
        self.entries.remove(cart_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn custom(choice: &str, component: Option<&str>) -> CustomizationSelection {
        CustomizationSelection {
            choice_id: choice.to_string(),
            deal_product_id: component.map(|s| s.to_string()),
            price: 1.0,
            original_price: 1.0,
        }
    }

    fn extra(choice: &str, component: Option<&str>) -> ExpandableSelection {
        ExpandableSelection {
            choice_id: choice.to_string(),
            deal_product_id: component.map(|s| s.to_string()),
            price: 1.0,
        }
    }

    fn product(id: &str) -> LineKind {
        LineKind::Product {
            product_id: id.to_string(),
        }
    }

    #[test]
    fn test_signature_shape() {
        let sig = line_signature(
            &product("7"),
            &[custom("12", None)],
            &[extra("3", Some("5"))],
        );
        assert_eq!(sig, "Product-7|none:12|5:3");
    }

    #[test]
    fn test_signature_is_order_independent() {
        let a = line_signature(
            &product("7"),
            &[custom("2", None), custom("1", None)],
            &[extra("9", None), extra("4", None)],
        );
        let b = line_signature(
            &product("7"),
            &[custom("1", None), custom("2", None)],
            &[extra("4", None), extra("9", None)],
        );
        assert_eq!(a, b);
    }

    #[test]
    fn test_signature_distinguishes_component_scope() {
        // same choice on different deal components is a different config
        let a = line_signature(
            &LineKind::Deal {
                deal_id: "3".into(),
            },
            &[custom("12", Some("1"))],
            &[],
        );
        let b = line_signature(
            &LineKind::Deal {
                deal_id: "3".into(),
            },
            &[custom("12", Some("2"))],
            &[],
        );
        assert_ne!(a, b);
    }

    #[test]
    fn test_cache_excludes_free_lines() {
        let cache = SignatureCache::new();
        let paid = CartLine {
            line_id: "l1".into(),
            kind: product("7"),
            quantity: 1,
            is_free: false,
            granted_by: None,
            unit_price: 10.0,
            unit_sale_price: None,
            customizations: vec![],
            extras: vec![],
        };
        let free = CartLine {
            line_id: "l2".into(),
            is_free: true,
            granted_by: Some("offer-1".into()),
            ..paid.clone()
        };

        cache.store("c1", &[paid.clone(), free]);
        let sig = signature_of(&paid);
        assert_eq!(cache.lookup("c1", &sig), Some("l1".to_string()));

        cache.invalidate("c1");
        assert_eq!(cache.lookup("c1", &sig), None);
    }
}
