use crate::extract::product::Product;
use indexmap::IndexMap;
use std::collections::HashSet;

/// Admission check for a resolved triple. All conditions are required.
pub fn admit(name: String, price: String, link: String) -> Option<Product> {
    let admissible = !name.is_empty()
        && !price.is_empty()
        && !link.is_empty()
        && name.chars().count() > 1
        && price.chars().any(|c| c.is_ascii_digit());

    admissible.then(|| Product { name, price, link })
}

/// Drop repeated links, and items whose name and fragment-less link match a
/// product already kept. First-seen order is preserved.
pub fn dedup(products: impl IntoIterator<Item = Product>) -> Vec<Product> {
    let mut kept: IndexMap<String, Product> = IndexMap::new();
    let mut seen_name_links: HashSet<(String, String)> = HashSet::new();

    for product in products {
        if kept.contains_key(&product.link) {
            log::trace!("Dropping duplicate link {}", product.link);
            continue;
        }

        let key = (product.name.clone(), product.link_without_fragment().to_string());
        if !seen_name_links.insert(key) {
            log::trace!("Dropping fragment variant {}", product.link);
            continue;
        }

        kept.insert(product.link.clone(), product);
    }

    kept.into_values().collect()
}
