//! Full-listing pagination over the Catalog API

use crate::catalog::api::CatalogApi;
use crate::error::{ClientError, ClientResult};
use storefront_core::Product;
use tracing::{debug, warn};

/// Read every page of the listing, starting at page 1
///
/// Stops once the requested page reaches the server-reported `last_page`
/// (0 counts as 1). Gives up with [`ClientError::PaginationLimit`] rather
/// than request more than `max_pages` pages.
pub async fn fetch_all_pages(api: &dyn CatalogApi, max_pages: u32) -> ClientResult<Vec<Product>> {
    let mut products = Vec::new();
    let mut page: u32 = 1;

    loop {
        if page > max_pages {
            return Err(ClientError::PaginationLimit { pages: max_pages });
        }

        let response = api.fetch_page(page).await?;
        let last_page = response.last_page.max(1);
        debug!(page, last_page, items = response.data.len(), "Fetched product page");
        for product in response.data.iter().filter(|product| product.price.is_none()) {
            warn!(page, id = product.id, "Product listed without a readable price");
        }
        products.extend(response.data);

        if page >= last_page {
            break;
        }
        page += 1;
    }

    Ok(products)
}

/// Collapse duplicate ids and order by id, newest first
pub fn into_snapshot(mut products: Vec<Product>) -> Vec<Product> {
    products.sort_by(|a, b| b.id.cmp(&a.id));
    products.dedup_by_key(|product| product.id);
    products
}
