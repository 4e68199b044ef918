//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tracing::instrument;

use ifacens_core::{Product, currency::format_brl};

use crate::filters;
use crate::state::AppState;
use crate::supabase::Stand;

// =============================================================================
// Stand and Product Views
// =============================================================================

/// Product display data for templates.
#[derive(Clone)]
pub struct ProductView {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: String,
    pub image: Option<String>,
    pub sold_out: bool,
}

impl From<&Product> for ProductView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.as_str().to_string(),
            name: product.name.clone(),
            description: product.description.clone(),
            price: format_brl(product.price),
            image: product.image.clone(),
            sold_out: product.stock == Some(0),
        }
    }
}

/// A stand together with its products, as one section of the home page.
#[derive(Clone)]
pub struct StandSection {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub products: Vec<ProductView>,
}

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    /// Stands with their product grids.
    pub stands: Vec<StandSection>,
    /// Set when the catalog could not be fetched at all.
    pub catalog_unavailable: bool,
}

/// Display the home page.
///
/// Catalog failures degrade to an empty page with a notice instead of a 500;
/// the food court stays browsable for whatever did load.
#[instrument(skip(state))]
pub async fn home(State(state): State<AppState>) -> impl IntoResponse {
    let stands = match state.supabase().list_stands().await {
        Ok(stands) => stands,
        Err(e) => {
            tracing::error!("Failed to fetch stands: {e}");
            return HomeTemplate {
                stands: Vec::new(),
                catalog_unavailable: true,
            };
        }
    };

    let mut sections = Vec::with_capacity(stands.len());
    for stand in stands {
        let products = state.supabase().list_products(&stand.id).await.map_or_else(
            |e| {
                tracing::error!("Failed to fetch products for stand {}: {e}", stand.id);
                Vec::new()
            },
            |products| products.iter().map(ProductView::from).collect(),
        );

        sections.push(section_from(stand, products));
    }

    HomeTemplate {
        stands: sections,
        catalog_unavailable: false,
    }
}

fn section_from(stand: Stand, products: Vec<ProductView>) -> StandSection {
    StandSection {
        id: stand.id.as_str().to_string(),
        name: stand.name,
        description: stand.description,
        image: stand.image,
        products,
    }
}
