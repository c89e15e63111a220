//! Product route handlers.
//!
//! The listing reads its filter from the query string. The filter form
//! re-requests `/products` through htmx with `hx-sync="this:replace"`, so a
//! newer filter change aborts the request it supersedes and only the latest
//! grid is ever swapped in. htmx requests get just the grid fragment.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use rust_decimal::Decimal;
use tracing::instrument;

use shopnow_core::{Category, PageInfo, Product, ProductFilter, ProductId, format_amount};

use crate::catalog::ProductPage;
use crate::filters;
use crate::routes::is_htmx;
use crate::services::catalog::{self, CatalogView, ProductLookup};
use crate::state::AppState;

/// Price ceilings offered in the sidebar.
const PRICE_STEPS: [i64; 5] = [50, 100, 250, 500, 1000];

/// Largest quantity offered on the detail page.
const MAX_SELECTABLE_QUANTITY: u32 = 10;

/// Product display data for templates.
#[derive(Clone)]
pub struct ProductView {
    pub id: String,
    pub href: String,
    pub name: String,
    pub description: String,
    pub price: String,
    pub image_url: Option<String>,
    pub category: Option<String>,
}

impl From<&Product> for ProductView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.to_string(),
            href: product.path(),
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price.display(),
            image_url: product.image().map(ToString::to_string),
            category: product.category_name().map(ToString::to_string),
        }
    }
}

/// A quantity choice on the detail page, labelled with its line total.
#[derive(Clone)]
pub struct QuantityOption {
    pub value: u32,
    pub label: String,
}

fn quantity_options(product: &Product) -> Vec<QuantityOption> {
    (1..=MAX_SELECTABLE_QUANTITY)
        .map(|value| QuantityOption {
            value,
            label: format!("{value} - {}", format_amount(product.price * value)),
        })
        .collect()
}

/// A category choice in the filter sidebar.
#[derive(Clone)]
pub struct CategoryOption {
    pub name: String,
    pub selected: bool,
}

/// A price ceiling choice in the filter sidebar.
#[derive(Clone)]
pub struct PriceOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

/// An active filter with a link that removes it.
#[derive(Clone)]
pub struct FilterChip {
    pub label: String,
    pub remove_href: String,
}

/// Previous/next links for a paginated listing.
#[derive(Clone)]
pub struct Pager {
    pub current: u32,
    pub total: Option<u64>,
    pub prev_href: Option<String>,
    pub next_href: Option<String>,
}

/// The swappable part of the listing page.
#[derive(Clone)]
pub struct ProductGrid {
    pub products: Vec<ProductView>,
    pub notice: Option<String>,
    pub chips: Vec<FilterChip>,
    pub pager: Option<Pager>,
}

impl ProductGrid {
    fn new(filter: &ProductFilter, listing: CatalogView<ProductPage>) -> Self {
        let CatalogView { data, notice } = listing;
        Self {
            products: data.products.iter().map(ProductView::from).collect(),
            notice,
            chips: filter_chips(filter),
            pager: data.page_info.map(|info| pager(filter, info)),
        }
    }
}

fn filter_chips(filter: &ProductFilter) -> Vec<FilterChip> {
    let mut chips = Vec::new();
    if let Some(category) = &filter.category {
        chips.push(FilterChip {
            label: format!("Category: {category}"),
            remove_href: filter.toggle_category(category).products_path(),
        });
    }
    if let Some(max_price) = filter.max_price {
        chips.push(FilterChip {
            label: format!("Max Price: ${}", max_price.normalize()),
            remove_href: filter.without_max_price().products_path(),
        });
    }
    if let Some(search) = &filter.search {
        chips.push(FilterChip {
            label: format!("Search: {search}"),
            remove_href: ProductFilter {
                search: None,
                page: None,
                ..filter.clone()
            }
            .products_path(),
        });
    }
    chips
}

fn pager(filter: &ProductFilter, info: PageInfo) -> Pager {
    let current = filter.page.unwrap_or(1).max(1);
    Pager {
        current,
        total: info.count,
        prev_href: (info.has_previous && current > 1)
            .then(|| filter.with_page(current - 1).products_path()),
        next_href: info
            .has_next
            .then(|| filter.with_page(current.saturating_add(1)).products_path()),
    }
}

fn category_options(categories: &[Category], filter: &ProductFilter) -> Vec<CategoryOption> {
    categories
        .iter()
        .map(|category| CategoryOption {
            name: category.name.clone(),
            selected: filter.category.as_deref() == Some(category.name.as_str()),
        })
        .collect()
}

fn price_options(filter: &ProductFilter) -> Vec<PriceOption> {
    let mut steps: Vec<Decimal> = PRICE_STEPS.iter().map(|&p| Decimal::from(p)).collect();
    // Keep a bookmarked custom ceiling selectable
    if let Some(current) = filter.max_price.map(|p| p.normalize())
        && !steps.contains(&current)
    {
        steps.push(current);
        steps.sort();
    }

    steps
        .into_iter()
        .map(|step| PriceOption {
            value: step.to_string(),
            label: format!("Under ${step}"),
            selected: filter.max_price.map(|p| p.normalize()) == Some(step),
        })
        .collect()
}

/// Product listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub search: String,
    pub categories: Vec<CategoryOption>,
    pub category_notice: Option<String>,
    pub price_options: Vec<PriceOption>,
    pub grid: ProductGrid,
}

impl ProductsIndexTemplate {
    /// Whether the "All" category choice is the active one.
    fn all_categories(&self) -> bool {
        !self.categories.iter().any(|c| c.selected)
    }
}

/// Product grid fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/product_grid.html")]
pub struct ProductGridTemplate {
    pub grid: ProductGrid,
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub product: ProductView,
    pub notice: Option<String>,
    pub quantities: Vec<QuantityOption>,
}

/// Product not found page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/not_found.html")]
pub struct ProductNotFoundTemplate {
    pub reason: String,
}

/// Display product listing page.
#[instrument(skip(state, headers), fields(query = %filter.to_query_string()))]
pub async fn index(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(filter): Query<ProductFilter>,
) -> Response {
    if is_htmx(&headers) {
        let listing = catalog::products(state.catalog(), &filter).await;
        return ProductGridTemplate {
            grid: ProductGrid::new(&filter, listing),
        }
        .into_response();
    }

    let (categories, listing) = tokio::join!(
        catalog::sidebar_categories(state.catalog()),
        catalog::products(state.catalog(), &filter),
    );

    ProductsIndexTemplate {
        search: filter.search.clone().unwrap_or_default(),
        categories: category_options(&categories.data, &filter),
        category_notice: categories.notice,
        price_options: price_options(&filter),
        grid: ProductGrid::new(&filter, listing),
    }
    .into_response()
}

/// Display product detail page.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let Ok(id) = id.parse::<ProductId>() else {
        return not_found("The requested product could not be found.");
    };

    match catalog::product(state.catalog(), id).await {
        ProductLookup::Found(CatalogView { data, notice }) => ProductShowTemplate {
            product: ProductView::from(&data),
            notice,
            quantities: quantity_options(&data),
        }
        .into_response(),
        ProductLookup::Missing { reason } => not_found(&reason),
    }
}

fn not_found(reason: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        ProductNotFoundTemplate {
            reason: reason.to_string(),
        },
    )
        .into_response()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use shopnow_core::{CategoryId, offline};

    use super::*;

    fn filter(category: Option<&str>, max_price: Option<i64>) -> ProductFilter {
        ProductFilter {
            category: category.map(ToString::to_string),
            max_price: max_price.map(Decimal::from),
            ..ProductFilter::default()
        }
    }

    #[test]
    fn test_product_view_links_to_detail_page() {
        let product = offline::product(ProductId::new(1)).unwrap();
        let view = ProductView::from(&product);
        assert_eq!(view.href, "/products/1");
        assert_eq!(view.price, "$99.99");
        assert_eq!(view.category.as_deref(), Some("Electronics"));
    }

    #[test]
    fn test_quantity_options_show_line_totals() {
        let product = offline::product(ProductId::new(1)).unwrap();
        let options = quantity_options(&product);
        assert_eq!(options.len(), 10);
        assert_eq!(options[0].label, "1 - $99.99");
        assert_eq!(options[2].value, 3);
        assert_eq!(options[2].label, "3 - $299.97");
    }

    #[test]
    fn test_chips_remove_one_filter_each() {
        let chips = filter_chips(&filter(Some("Books"), Some(50)));
        assert_eq!(chips.len(), 2);
        assert_eq!(chips[0].remove_href, "/products?max_price=50");
        assert_eq!(chips[1].remove_href, "/products?category=Books");
    }

    #[test]
    fn test_pager_links_keep_filter() {
        let mut current = filter(Some("Books"), None);
        current.page = Some(2);
        let pager = pager(
            &current,
            PageInfo {
                count: Some(45),
                has_next: true,
                has_previous: true,
            },
        );

        assert_eq!(pager.prev_href.as_deref(), Some("/products?category=Books"));
        assert_eq!(
            pager.next_href.as_deref(),
            Some("/products?category=Books&page=3")
        );
    }

    #[test]
    fn test_category_options_mark_selection() {
        let categories = vec![
            Category::new(CategoryId::new(1), "Electronics"),
            Category::new(CategoryId::new(2), "Clothing"),
        ];
        let options = category_options(&categories, &filter(Some("Clothing"), None));
        assert!(!options[0].selected);
        assert!(options[1].selected);
    }

    #[test]
    fn test_price_options_keep_custom_ceiling() {
        let options = price_options(&filter(None, Some(75)));
        let values: Vec<&str> = options.iter().map(|o| o.value.as_str()).collect();
        assert_eq!(values, vec!["50", "75", "100", "250", "500", "1000"]);
        assert!(options[1].selected);
    }
}
