//! The form controller: UI actions in, HTTP calls out, view state back.
//!
//! Each operation is a single best-effort request. There are no retries and
//! no cancellation; the caller owns the controller mutably for the duration
//! of an operation, so view updates apply in call order.

use suppliers_api::{ApiError, SupplierApi};
use suppliers_types::{
    NewSupplier, ProductsParseError, SearchCriteria, Supplier, SupplierId, parse_products_field,
};
use thiserror::Error;

use crate::{FlashMessage, FormFields, ResultsTable};

/// Flash text after any successful create/update/retrieve/search/list/
/// add-products operation.
pub const SUCCESS_FLASH: &str = "Success";

/// Flash text after a successful delete, regardless of response body.
pub const DELETED_FLASH: &str = "Supplier has been deleted!";

/// Why an operation failed. Local input errors are caught before any
/// request is made; both kinds surface through the flash line identically.
#[derive(Debug, Error)]
pub enum FormError {
    #[error(transparent)]
    Products(#[from] ProductsParseError),
    #[error("supplier id is required")]
    MissingId,
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Binds the entry form, flash line, and results table to a supplier API.
///
/// Generic over [`SupplierApi`] so the full success/failure state machine
/// can be exercised against a stub.
#[derive(Debug)]
pub struct FormController<A> {
    api: A,
    pub form: FormFields,
    pub flash: FlashMessage,
    pub results: ResultsTable,
}

impl<A: SupplierApi> FormController<A> {
    pub fn new(api: A) -> Self {
        Self::with_form(api, FormFields::default())
    }

    /// Start from previously captured form state (the CLI's persisted
    /// session).
    pub fn with_form(api: A, form: FormFields) -> Self {
        Self {
            api,
            form,
            flash: FlashMessage::new(),
            results: ResultsTable::new(),
        }
    }

    /// Create a supplier from the name/address/email/products fields.
    ///
    /// On success every field is overwritten from the response, including
    /// the server-assigned id. On failure the fields are left untouched.
    pub async fn create(&mut self) -> Result<(), FormError> {
        let record = match self.read_record() {
            Ok(record) => record,
            Err(err) => return self.fail(err),
        };
        match self.api.create(&record).await {
            Ok(supplier) => self.applied(&supplier),
            Err(err) => self.fail(err.into()),
        }
    }

    /// Update the supplier named by the id field. Same field handling as
    /// [`FormController::create`].
    pub async fn update(&mut self) -> Result<(), FormError> {
        let id = match self.require_id() {
            Ok(id) => id,
            Err(err) => return self.fail(err),
        };
        let record = match self.read_record() {
            Ok(record) => record,
            Err(err) => return self.fail(err),
        };
        match self.api.update(&id, &record).await {
            Ok(supplier) => self.applied(&supplier),
            Err(err) => self.fail(err.into()),
        }
    }

    /// Fetch the supplier named by the id field. On failure the whole form
    /// is cleared before the error is flashed.
    pub async fn retrieve(&mut self) -> Result<(), FormError> {
        let id = match self.require_id() {
            Ok(id) => id,
            Err(err) => return self.fail(err),
        };
        match self.api.retrieve(&id).await {
            Ok(supplier) => self.applied(&supplier),
            Err(err) => {
                self.form.clear();
                self.fail(err.into())
            }
        }
    }

    /// Delete the supplier named by the id field. Success clears the form
    /// and shows the fixed confirmation text.
    pub async fn delete(&mut self) -> Result<(), FormError> {
        let id = match self.require_id() {
            Ok(id) => id,
            Err(err) => return self.fail(err),
        };
        match self.api.delete(&id).await {
            Ok(()) => {
                self.form.clear();
                self.flash.set(DELETED_FLASH);
                Ok(())
            }
            Err(err) => self.fail(err.into()),
        }
    }

    /// Reset every form field, id included. No network call.
    pub fn clear(&mut self) {
        self.form.clear();
    }

    /// Criteria built from the currently filled search fields.
    pub fn criteria(&self) -> SearchCriteria {
        let mut criteria = SearchCriteria::new();
        criteria.push("name", &self.form.name);
        criteria.push("address", &self.form.address);
        criteria.push("email", &self.form.email);
        criteria.push("products", &self.form.products);
        criteria
    }

    /// Search with criteria read from the form fields.
    pub async fn search(&mut self) -> Result<(), FormError> {
        let criteria = self.criteria();
        self.search_with(criteria).await
    }

    /// Search with explicit criteria (the CLI adds an id filter this way).
    ///
    /// Success replaces the results table and copies the first returned
    /// record into the form; failure clears both table and form.
    pub async fn search_with(&mut self, criteria: SearchCriteria) -> Result<(), FormError> {
        match self.api.search(&criteria).await {
            Ok(rows) => self.show_results(rows),
            Err(err) => {
                self.results.clear();
                self.form.clear();
                self.fail(err.into())
            }
        }
    }

    /// Fetch every supplier. Identical handling to a search without
    /// criteria.
    pub async fn list(&mut self) -> Result<(), FormError> {
        match self.api.list().await {
            Ok(rows) => self.show_results(rows),
            Err(err) => {
                self.results.clear();
                self.form.clear();
                self.fail(err.into())
            }
        }
    }

    /// Append the products field to the supplier named by the id field.
    pub async fn add_products(&mut self) -> Result<(), FormError> {
        let id = match self.require_id() {
            Ok(id) => id,
            Err(err) => return self.fail(err),
        };
        let products = match parse_products_field(&self.form.products) {
            Ok(products) => products,
            Err(err) => return self.fail(err.into()),
        };
        match self.api.add_products(&id, &products).await {
            Ok(supplier) => self.applied(&supplier),
            Err(err) => self.fail(err.into()),
        }
    }

    fn read_record(&self) -> Result<NewSupplier, FormError> {
        let products = parse_products_field(&self.form.products)?;
        Ok(NewSupplier {
            name: self.form.name.clone(),
            address: self.form.address.clone(),
            email: self.form.email.clone(),
            products,
        })
    }

    fn require_id(&self) -> Result<SupplierId, FormError> {
        SupplierId::parse(&self.form.id).ok_or(FormError::MissingId)
    }

    fn applied(&mut self, supplier: &Supplier) -> Result<(), FormError> {
        self.form.apply_record(supplier);
        self.flash.set(SUCCESS_FLASH);
        Ok(())
    }

    fn show_results(&mut self, rows: Vec<Supplier>) -> Result<(), FormError> {
        if let Some(first) = rows.first() {
            self.form.apply_record(first);
        }
        self.results.replace(rows);
        self.flash.set(SUCCESS_FLASH);
        Ok(())
    }

    fn fail(&mut self, err: FormError) -> Result<(), FormError> {
        self.flash.set(err.to_string());
        Err(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use suppliers_types::{ProductId, SupplierId};

    /// Scripted API double: one canned answer per operation family, plus a
    /// log of which operations were reached.
    #[derive(Default)]
    struct StubApi {
        record: Option<Supplier>,
        records: Vec<Supplier>,
        failure: Option<(u16, String)>,
        calls: Mutex<Vec<&'static str>>,
    }

    impl StubApi {
        fn returning(record: Supplier) -> Self {
            Self {
                record: Some(record),
                ..Self::default()
            }
        }

        fn listing(records: Vec<Supplier>) -> Self {
            Self {
                records,
                ..Self::default()
            }
        }

        fn failing(status: u16, message: &str) -> Self {
            Self {
                failure: Some((status, message.to_string())),
                ..Self::default()
            }
        }

        fn log(&self, op: &'static str) -> Result<(), ApiError> {
            self.calls.lock().unwrap().push(op);
            match &self.failure {
                Some((status, message)) => Err(ApiError::Remote {
                    status: *status,
                    message: message.clone(),
                }),
                None => Ok(()),
            }
        }

        fn record(&self) -> Supplier {
            self.record.clone().expect("stub record not configured")
        }

        fn calls(&self) -> Vec<&'static str> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SupplierApi for StubApi {
        async fn create(&self, _record: &NewSupplier) -> Result<Supplier, ApiError> {
            self.log("create")?;
            Ok(self.record())
        }

        async fn update(&self, _id: &SupplierId, _record: &NewSupplier) -> Result<Supplier, ApiError> {
            self.log("update")?;
            Ok(self.record())
        }

        async fn retrieve(&self, _id: &SupplierId) -> Result<Supplier, ApiError> {
            self.log("retrieve")?;
            Ok(self.record())
        }

        async fn delete(&self, _id: &SupplierId) -> Result<(), ApiError> {
            self.log("delete")
        }

        async fn search(&self, _criteria: &SearchCriteria) -> Result<Vec<Supplier>, ApiError> {
            self.log("search")?;
            Ok(self.records.clone())
        }

        async fn list(&self) -> Result<Vec<Supplier>, ApiError> {
            self.log("list")?;
            Ok(self.records.clone())
        }

        async fn add_products(&self, _id: &SupplierId, _products: &[ProductId]) -> Result<Supplier, ApiError> {
            self.log("add_products")?;
            Ok(self.record())
        }
    }

    fn acme() -> Supplier {
        Supplier {
            id: SupplierId::Number(7),
            name: "Acme".into(),
            address: "X".into(),
            email: "a@b.c".into(),
            products: vec![ProductId::Number(1), ProductId::Number(2)],
        }
    }

    fn filled_form() -> FormFields {
        FormFields {
            id: String::new(),
            name: "Acme".into(),
            address: "X".into(),
            email: "a@b.c".into(),
            products: "1, 2".into(),
        }
    }

    #[tokio::test]
    async fn create_success_overwrites_form_including_assigned_id() {
        let mut controller = FormController::with_form(StubApi::returning(acme()), filled_form());

        controller.create().await.unwrap();

        assert_eq!(controller.form.id, "7");
        assert_eq!(controller.form.name, "Acme");
        assert_eq!(controller.form.address, "X");
        assert_eq!(controller.form.email, "a@b.c");
        assert_eq!(controller.form.products, "1, 2");
        assert_eq!(controller.flash.line(), SUCCESS_FLASH);
    }

    #[tokio::test]
    async fn create_failure_flashes_server_message_and_keeps_fields() {
        let mut controller = FormController::with_form(StubApi::failing(400, "name is required"), filled_form());

        let err = controller.create().await.unwrap_err();

        assert!(matches!(err, FormError::Api(_)));
        assert_eq!(controller.flash.line(), "name is required");
        assert_eq!(controller.form, filled_form(), "failure must not touch the fields");
    }

    #[tokio::test]
    async fn bad_products_field_fails_before_any_request() {
        let mut form = filled_form();
        form.products = "widgets, gadgets".into();
        let mut controller = FormController::with_form(StubApi::returning(acme()), form);

        let err = controller.create().await.unwrap_err();

        assert!(matches!(err, FormError::Products(_)));
        assert!(!controller.flash.is_empty());
        assert!(controller.api.calls().is_empty(), "no request may be sent");
    }

    #[tokio::test]
    async fn update_requires_an_id() {
        let mut controller = FormController::with_form(StubApi::returning(acme()), filled_form());

        let err = controller.update().await.unwrap_err();

        assert!(matches!(err, FormError::MissingId));
        assert_eq!(controller.flash.line(), "supplier id is required");
        assert!(controller.api.calls().is_empty());
    }

    #[tokio::test]
    async fn retrieve_failure_clears_form_and_shows_exact_message() {
        let mut form = filled_form();
        form.id = "42".into();
        let mut controller = FormController::with_form(StubApi::failing(404, "not found"), form);

        controller.retrieve().await.unwrap_err();

        assert!(controller.form.is_empty(), "retrieve failure clears the form");
        assert_eq!(controller.flash.line(), "not found");
    }

    #[tokio::test]
    async fn delete_success_clears_form_and_shows_fixed_text() {
        let mut form = filled_form();
        form.id = "7".into();
        let mut controller = FormController::with_form(StubApi::default(), form);

        controller.delete().await.unwrap();

        assert!(controller.form.is_empty());
        assert_eq!(controller.flash.line(), DELETED_FLASH);
    }

    #[tokio::test]
    async fn delete_failure_keeps_form_and_flashes_message() {
        let mut form = filled_form();
        form.id = "7".into();
        let mut controller = FormController::with_form(StubApi::failing(404, "no such supplier"), form.clone());

        controller.delete().await.unwrap_err();

        assert_eq!(controller.form, form);
        assert_eq!(controller.flash.line(), "no such supplier");
    }

    #[tokio::test]
    async fn search_fills_table_and_copies_first_record_into_form() {
        let second = Supplier {
            id: SupplierId::Number(8),
            name: "Globex".into(),
            ..acme()
        };
        let mut form = FormFields::default();
        form.name = "A".into();
        let mut controller = FormController::with_form(StubApi::listing(vec![acme(), second]), form);

        controller.search().await.unwrap();

        assert_eq!(controller.results.len(), 2);
        assert_eq!(controller.form.id, "7", "first record lands in the form");
        assert_eq!(controller.flash.line(), SUCCESS_FLASH);
    }

    #[tokio::test]
    async fn search_with_no_matches_leaves_form_unpopulated() {
        let mut form = FormFields::default();
        form.name = "Nobody".into();
        let mut controller = FormController::with_form(StubApi::listing(Vec::new()), form.clone());

        controller.search().await.unwrap();

        assert!(controller.results.is_empty());
        assert_eq!(controller.form, form, "empty result must not rewrite the form");
        assert_eq!(controller.flash.line(), SUCCESS_FLASH);
    }

    #[tokio::test]
    async fn search_failure_clears_results_and_form() {
        let mut controller = FormController::with_form(StubApi::failing(400, "bad criteria"), filled_form());
        controller.results.replace(vec![acme()]);

        controller.search().await.unwrap_err();

        assert!(controller.results.is_empty());
        assert!(controller.form.is_empty());
        assert_eq!(controller.flash.line(), "bad criteria");
    }

    #[tokio::test]
    async fn list_behaves_like_an_unfiltered_search() {
        let mut controller = FormController::new(StubApi::listing(vec![acme()]));

        controller.list().await.unwrap();

        assert_eq!(controller.api.calls(), vec!["list"]);
        assert_eq!(controller.results.len(), 1);
        assert_eq!(controller.form.name, "Acme");
    }

    #[tokio::test]
    async fn add_products_applies_returned_record() {
        let mut form = FormFields::default();
        form.id = "7".into();
        form.products = "3".into();
        let mut updated = acme();
        updated.products.push(ProductId::Number(3));
        let mut controller = FormController::with_form(StubApi::returning(updated), form);

        controller.add_products().await.unwrap();

        assert_eq!(controller.form.products, "1, 2, 3");
        assert_eq!(controller.flash.line(), SUCCESS_FLASH);
    }

    #[test]
    fn clear_resets_fields_without_touching_the_api() {
        let mut controller = FormController::with_form(StubApi::returning(acme()), filled_form());

        controller.clear();

        assert!(controller.form.is_empty());
        assert!(controller.api.calls().is_empty());
    }

    #[test]
    fn criteria_include_only_filled_fields_in_field_order() {
        let mut form = FormFields::default();
        form.name = "Acme".into();
        form.products = "1".into();
        let controller = FormController::with_form(StubApi::default(), form);

        let fields: Vec<(String, String)> = controller
            .criteria()
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        assert_eq!(
            fields,
            vec![("name".into(), "Acme".into()), ("products".into(), "1".into())]
        );
    }
}
