//! Client-side filtering and sorting of catalog lists.
//!
//! The server returns full product and recipe lists; screens narrow and
//! order them locally.

use std::cmp::Ordering;

use crate::models::{Product, Recipe};
use crate::utils::{cmp_ignore_case, contains_ignore_case};

// Sorting options for the product list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProductSortColumn {
    #[default]
    Name,
    Price,
}

#[derive(Debug, Clone, Default)]
pub struct ProductQuery {
    pub category: Option<i64>,
    pub search: String,
    pub max_price: Option<f64>,
    pub in_stock_only: bool,
    pub sort: ProductSortColumn,
    pub descending: bool,
}

impl ProductQuery {
    fn matches(&self, product: &Product, query: &str) -> bool {
        if self.category.is_some() && product.category != self.category {
            return false;
        }
        if self.in_stock_only && !product.in_stock() {
            return false;
        }
        if let Some(max) = self.max_price {
            // Unpriced products never pass a price cap
            if product.price_value().map(|p| p > max).unwrap_or(true) {
                return false;
            }
        }
        contains_ignore_case(&product.name, query)
            || product
                .description
                .as_ref()
                .map(|d| contains_ignore_case(d, query))
                .unwrap_or(false)
    }

    /// Filter and sort products
    pub fn apply<'a>(&self, products: &'a [Product]) -> Vec<&'a Product> {
        let query = self.search.trim().to_lowercase();
        let mut selected: Vec<&Product> =
            products.iter().filter(|p| self.matches(p, &query)).collect();

        selected.sort_by(|a, b| {
            let cmp = match self.sort {
                ProductSortColumn::Name => cmp_ignore_case(&a.name, &b.name),
                ProductSortColumn::Price => cmp_price(a, b)
                    .then_with(|| cmp_ignore_case(&a.name, &b.name)),
            };
            if self.descending {
                cmp.reverse()
            } else {
                cmp
            }
        });
        selected
    }
}

/// Unparseable prices sort after every real price
fn cmp_price(a: &Product, b: &Product) -> Ordering {
    match (a.price_value(), b.price_value()) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[derive(Debug, Clone, Default)]
pub struct RecipeQuery {
    pub category: Option<i64>,
    pub search: String,
}

impl RecipeQuery {
    /// Filter recipes, ordered by name
    pub fn apply<'a>(&self, recipes: &'a [Recipe]) -> Vec<&'a Recipe> {
        let query = self.search.trim().to_lowercase();
        let mut selected: Vec<&Recipe> = recipes
            .iter()
            .filter(|r| self.category.is_none() || r.category == self.category)
            .filter(|r| {
                contains_ignore_case(&r.name, &query)
                    || r.description
                        .as_ref()
                        .map(|d| contains_ignore_case(d, &query))
                        .unwrap_or(false)
            })
            .collect();
        selected.sort_by(|a, b| cmp_ignore_case(&a.name, &b.name));
        selected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: i64, name: &str, price: &str, category: Option<i64>) -> Product {
        Product {
            id,
            name: name.to_string(),
            description: None,
            price: price.to_string(),
            category,
            image: None,
            stock: None,
            unit: None,
        }
    }

    fn catalog() -> Vec<Product> {
        let mut basil = product(1, "basil", "2.50", Some(1));
        basil.description = Some("Fresh Genovese herb".to_string());
        let mut flour = product(3, "Flour", "1.20", Some(2));
        flour.stock = Some(0);
        vec![
            basil,
            product(2, "Apples", "3.00", Some(2)),
            flour,
            product(4, "Mystery box", "TBD", None),
        ]
    }

    fn ids(products: Vec<&Product>) -> Vec<i64> {
        products.iter().map(|p| p.id).collect()
    }

    #[test]
    fn test_default_query_sorts_by_name() {
        let products = catalog();
        assert_eq!(ids(ProductQuery::default().apply(&products)), vec![2, 1, 3, 4]);
    }

    #[test]
    fn test_filter_by_category_and_search() {
        let products = catalog();
        let query = ProductQuery {
            category: Some(2),
            ..Default::default()
        };
        assert_eq!(ids(query.apply(&products)), vec![2, 3]);

        let query = ProductQuery {
            search: "HERB".to_string(),
            ..Default::default()
        };
        assert_eq!(ids(query.apply(&products)), vec![1]);
    }

    #[test]
    fn test_sort_by_price_puts_unpriced_last() {
        let products = catalog();
        let query = ProductQuery {
            sort: ProductSortColumn::Price,
            ..Default::default()
        };
        assert_eq!(ids(query.apply(&products)), vec![3, 1, 2, 4]);

        let query = ProductQuery {
            sort: ProductSortColumn::Price,
            descending: true,
            ..Default::default()
        };
        assert_eq!(ids(query.apply(&products)), vec![4, 2, 1, 3]);
    }

    #[test]
    fn test_max_price_and_stock() {
        let products = catalog();
        let query = ProductQuery {
            max_price: Some(2.5),
            ..Default::default()
        };
        assert_eq!(ids(query.apply(&products)), vec![1, 3]);

        let query = ProductQuery {
            max_price: Some(2.5),
            in_stock_only: true,
            ..Default::default()
        };
        assert_eq!(ids(query.apply(&products)), vec![1]);
    }

    #[test]
    fn test_recipe_query() {
        let recipes: Vec<Recipe> = serde_json::from_str(
            r#"[
                {"id": 1, "name": "Pesto", "category": 1, "description": "Basil sauce"},
                {"id": 2, "name": "apple pie", "category": 2},
                {"id": 3, "name": "Bruschetta", "category": 1}
            ]"#,
        )
        .unwrap();

        let all: Vec<i64> = RecipeQuery::default().apply(&recipes).iter().map(|r| r.id).collect();
        assert_eq!(all, vec![2, 3, 1]);

        let query = RecipeQuery {
            category: Some(1),
            search: "basil".to_string(),
        };
        let found: Vec<i64> = query.apply(&recipes).iter().map(|r| r.id).collect();
        assert_eq!(found, vec![1]);
    }
}
