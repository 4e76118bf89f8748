use crate::error::ApiError;
use crate::models::Product;
use crate::services::ProductApi;
use crate::stores::ResourceStore;

const SEARCH_FAILED: &str = "Ошибка поиска товара";

impl<S: ProductApi> ResourceStore<S> {
    /// A 404 is a normal `Ok(None)`. Other failures are recorded in `error` and returned.
    pub async fn search_by_barcode(&self, barcode: &str, organization_id: i64) -> Result<Option<Product>, ApiError> {
        let ticket = self.begin_lookup();
        match self.service().find_by_barcode(barcode, organization_id).await {
            Ok(found) => Ok(found),
            Err(err) => {
                self.record_failure(ticket, &err, SEARCH_FAILED);
                Err(err)
            }
        }
    }
}
