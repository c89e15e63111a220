//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tracing::instrument;

use shopnow_core::Category;

use crate::filters;
use crate::services::catalog;
use crate::state::AppState;

/// Category tile data for templates.
#[derive(Clone)]
pub struct CategoryView {
    pub name: String,
    pub href: String,
}

impl CategoryView {
    /// Build tiles in order; unnamed categories get a positional label.
    fn tiles(categories: &[Category]) -> Vec<Self> {
        categories
            .iter()
            .enumerate()
            .map(|(index, category)| {
                let name = if category.name.trim().is_empty() {
                    format!("Category {}", index + 1)
                } else {
                    category.name.clone()
                };
                Self {
                    name,
                    href: category.products_path(),
                }
            })
            .collect()
    }
}

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub categories: Vec<CategoryView>,
    pub notice: Option<String>,
}

/// Display home page.
#[instrument(skip(state))]
pub async fn home(State(state): State<AppState>) -> impl IntoResponse {
    let view = catalog::home_categories(state.catalog()).await;

    HomeTemplate {
        categories: CategoryView::tiles(&view.data),
        notice: view.notice,
    }
}

#[cfg(test)]
#[allow(clippy::indexing_slicing)]
mod tests {
    use shopnow_core::CategoryId;

    use super::*;

    #[test]
    fn test_tiles_link_to_filtered_catalog() {
        let tiles = CategoryView::tiles(&[
            Category::new(CategoryId::new(4), "Home & Kitchen"),
            Category::new(CategoryId::new(9), " "),
        ]);

        assert_eq!(tiles[0].href, "/products?category=Home%20%26%20Kitchen");
        assert_eq!(tiles[1].name, "Category 2");
    }
}
