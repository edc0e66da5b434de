use std::sync::Arc;

use futures::future::join_all;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use super::{ensure_owner, BrandService, CategoryService, ServiceError, SpecGroupService};
use crate::catalog::{parse_price, slugify};
use crate::database::models::{Product, ProductSpec};
use crate::media::{align_public_ids, realign_public_ids, resolve_public_id, tenant_prefix, MediaStore};

/// Distinguishes an explicit `null` (Some(Null)) from an absent field (None)
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Value>,
    pub sale_price: Option<Value>,
    pub stock: Option<i32>,
    pub sku: Option<String>,
    pub is_available: Option<bool>,
    pub category_id: Option<Uuid>,
    pub brand_id: Option<Uuid>,
    pub images: Option<Vec<String>>,
    pub images_public_ids: Option<Vec<String>>,
    pub special_features: Option<Vec<String>>,
    pub specs: Option<Vec<ProductSpec>>,
}

/// Fields a merchant may change on an existing product
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub sale_price: Option<Value>,
    pub stock: Option<i32>,
    pub sku: Option<String>,
    pub is_available: Option<bool>,
    pub images: Option<Vec<String>>,
    pub images_public_ids: Option<Vec<String>>,
    pub special_features: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedProduct {
    pub id: Uuid,
    pub images_deleted: usize,
    pub images_failed: usize,
}

fn price_field(field: &str, value: &Value) -> Result<Decimal, ServiceError> {
    parse_price(value).map_err(|e| ServiceError::invalid(field, e.to_string()))
}

/// Sale price: absent, null and blank all mean "no sale"
pub fn sale_price_field(value: Option<&Value>) -> Result<Option<Decimal>, ServiceError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(value) => price_field("salePrice", value).map(Some),
    }
}

/// Public ids for a new image list; a given list must line up with the images
pub fn initial_public_ids(images: &[String], ids: Option<Vec<String>>) -> Result<Vec<String>, ServiceError> {
    match ids {
        Some(ids) if ids.len() != images.len() => Err(ServiceError::invalid(
            "imagesPublicIds",
            "must have one entry per image",
        )),
        Some(ids) => Ok(ids),
        None => Ok(align_public_ids(Vec::new(), images.len())),
    }
}

/// Stored public ids must sit in the tenant's own media folder; empty ids
/// are placeholders and always allowed
pub fn ensure_tenant_public_ids(ids: &[String], prefix: &str) -> Result<(), ServiceError> {
    match ids.iter().find(|id| !id.is_empty() && !id.starts_with(prefix)) {
        Some(foreign) => {
            tracing::warn!("Rejected public id {} outside {}", foreign, prefix);
            Err(ServiceError::Forbidden("Image does not belong to this store".to_string()))
        }
        None => Ok(()),
    }
}

fn clean_name(name: &str) -> Result<String, ServiceError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ServiceError::invalid("name", "is required"));
    }
    Ok(name.to_string())
}

/// Apply the allowed subset of fields, keeping images and ids aligned
pub fn apply_patch(product: &mut Product, patch: ProductPatch) -> Result<(), ServiceError> {
    if let Some(name) = patch.name.as_deref() {
        product.name = clean_name(name)?;
        product.slug = slugify(&product.name);
    }
    if let Some(description) = patch.description {
        product.description = Some(description);
    }
    if let Some(price) = patch.price.as_ref() {
        product.price = price_field("price", price)?;
    }
    if patch.sale_price.is_some() {
        product.sale_price = sale_price_field(patch.sale_price.as_ref())?;
    }
    if let Some(stock) = patch.stock {
        product.stock = Some(stock);
    }
    if let Some(sku) = patch.sku {
        product.sku = Some(sku);
    }
    if let Some(is_available) = patch.is_available {
        product.is_available = is_available;
    }
    if let Some(features) = patch.special_features {
        product.special_features = features;
    }

    match (patch.images, patch.images_public_ids) {
        (Some(images), Some(ids)) => {
            product.images_public_ids = initial_public_ids(&images, Some(ids))?;
            product.images = images;
        }
        (Some(images), None) => {
            product.images_public_ids = realign_public_ids(&product.images, &product.images_public_ids, &images);
            product.images = images;
        }
        (None, Some(ids)) => {
            product.images_public_ids = initial_public_ids(&product.images, Some(ids))?;
        }
        (None, None) => {}
    }

    Ok(())
}

/// Delete one image from the media host, logging instead of failing.
/// Ids outside `prefix` belong to another tenant and are never deleted.
pub(crate) async fn destroy_best_effort(media: &dyn MediaStore, prefix: &str, public_id: &str) -> bool {
    if !public_id.starts_with(prefix) {
        tracing::warn!("Refusing to delete image {} outside {}", public_id, prefix);
        return false;
    }
    match media.destroy(public_id).await {
        Ok(found) => {
            if !found {
                tracing::warn!("Media host had no image {}", public_id);
            }
            found
        }
        Err(e) => {
            tracing::warn!("Failed to delete image {} from media host: {}", public_id, e);
            false
        }
    }
}

pub struct ProductService {
    pool: PgPool,
    media: Arc<dyn MediaStore>,
    folder_root: String,
}

impl ProductService {
    pub fn new(pool: PgPool, media: Arc<dyn MediaStore>, folder_root: impl Into<String>) -> Self {
        Self {
            pool,
            media,
            folder_root: folder_root.into(),
        }
    }

    fn prefix(&self, tenant_id: Uuid) -> String {
        tenant_prefix(&self.folder_root, tenant_id)
    }

    pub async fn list(&self, tenant_id: Uuid) -> Result<Vec<Product>, ServiceError> {
        let products =
            sqlx::query_as::<_, Product>("SELECT * FROM products WHERE tenant_id = $1 ORDER BY created_at DESC")
                .bind(tenant_id)
                .fetch_all(&self.pool)
                .await?;
        Ok(products)
    }

    /// 404 when the product does not exist, 403 when another store owns it
    pub async fn owned(&self, tenant_id: Uuid, id: Uuid) -> Result<Product, ServiceError> {
        let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Product not found".to_string()))?;
        ensure_owner(product.tenant_id, tenant_id, "Product")?;
        Ok(product)
    }

    pub async fn create(&self, tenant_id: Uuid, input: ProductInput) -> Result<Product, ServiceError> {
        let name = clean_name(input.name.as_deref().unwrap_or_default())?;
        let price = match input.price.as_ref() {
            Some(value) => price_field("price", value)?,
            None => return Err(ServiceError::invalid("price", "is required")),
        };
        let sale_price = sale_price_field(input.sale_price.as_ref())?;
        let images = input.images.unwrap_or_default();
        let public_ids = initial_public_ids(&images, input.images_public_ids)?;
        ensure_tenant_public_ids(&public_ids, &self.prefix(tenant_id))?;

        let categories = CategoryService::new(self.pool.clone());
        let category_id = match input.category_id {
            Some(id) => categories.owned(tenant_id, id).await?.id,
            None => categories.uncategorized(tenant_id).await?,
        };
        if let Some(brand_id) = input.brand_id {
            BrandService::new(self.pool.clone()).owned(tenant_id, brand_id).await?;
        }
        let specs = input.specs.unwrap_or_default();
        let groups = SpecGroupService::new(self.pool.clone());
        for spec in &specs {
            groups.owned(tenant_id, spec.spec_group_id).await?;
        }

        let product = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (
                id, tenant_id, category_id, brand_id, name, slug, description, price, sale_price,
                stock, sku, is_available, special_features, images, images_public_ids, specs
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(tenant_id)
        .bind(category_id)
        .bind(input.brand_id)
        .bind(&name)
        .bind(slugify(&name))
        .bind(input.description)
        .bind(price)
        .bind(sale_price)
        .bind(input.stock)
        .bind(input.sku)
        .bind(input.is_available.unwrap_or(true))
        .bind(input.special_features.unwrap_or_default())
        .bind(&images)
        .bind(&public_ids)
        .bind(Json(specs))
        .fetch_one(&self.pool)
        .await?;

        tracing::info!("Created product '{}' ({}) for tenant {}", product.name, product.id, tenant_id);
        Ok(product)
    }

    pub async fn update(&self, tenant_id: Uuid, id: Uuid, patch: ProductPatch) -> Result<Product, ServiceError> {
        if let Some(ids) = patch.images_public_ids.as_deref() {
            ensure_tenant_public_ids(ids, &self.prefix(tenant_id))?;
        }
        let mut product = self.owned(tenant_id, id).await?;
        apply_patch(&mut product, patch)?;

        let product = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products
            SET name = $3, slug = $4, description = $5, price = $6, sale_price = $7, stock = $8,
                sku = $9, is_available = $10, special_features = $11, images = $12,
                images_public_ids = $13, updated_at = now()
            WHERE id = $1 AND tenant_id = $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(tenant_id)
        .bind(&product.name)
        .bind(&product.slug)
        .bind(&product.description)
        .bind(product.price)
        .bind(product.sale_price)
        .bind(product.stock)
        .bind(&product.sku)
        .bind(product.is_available)
        .bind(&product.special_features)
        .bind(&product.images)
        .bind(&product.images_public_ids)
        .fetch_one(&self.pool)
        .await?;

        Ok(product)
    }

    /// Remove every image from the media host (best effort), then the row
    pub async fn delete(&self, tenant_id: Uuid, id: Uuid) -> Result<DeletedProduct, ServiceError> {
        let product = self.owned(tenant_id, id).await?;

        let public_ids: Vec<String> = product
            .images
            .iter()
            .filter_map(|url| resolve_public_id(&product.images, &product.images_public_ids, url))
            .collect();

        let prefix = self.prefix(tenant_id);
        let results = join_all(
            public_ids
                .iter()
                .map(|public_id| destroy_best_effort(self.media.as_ref(), &prefix, public_id)),
        )
        .await;
        let images_deleted = results.iter().filter(|deleted| **deleted).count();

        sqlx::query("DELETE FROM products WHERE id = $1 AND tenant_id = $2")
            .bind(id)
            .bind(tenant_id)
            .execute(&self.pool)
            .await?;

        tracing::info!(
            "Deleted product {} for tenant {} ({} of {} images removed from media host)",
            id,
            tenant_id,
            images_deleted,
            public_ids.len()
        );

        Ok(DeletedProduct {
            id,
            images_deleted,
            images_failed: public_ids.len() - images_deleted,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{database_pool, lazy_pool, new_tenant, FakeMediaStore};
    use chrono::Utc;
    use rust_decimal::Decimal;
    use serde_json::json;
    use std::str::FromStr;

    fn product(images: &[&str], ids: &[&str]) -> Product {
        Product {
            id: Uuid::new_v4(),
            tenant_id: Some(Uuid::new_v4()),
            category_id: Uuid::new_v4(),
            brand_id: None,
            name: "Phone".into(),
            slug: "phone".into(),
            description: None,
            price: Decimal::from(100),
            sale_price: Some(Decimal::from(90)),
            stock: None,
            sku: None,
            is_available: true,
            special_features: vec![],
            images: images.iter().map(|s| s.to_string()).collect(),
            images_public_ids: ids.iter().map(|s| s.to_string()).collect(),
            specs: Json(vec![]),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn patch(value: serde_json::Value) -> ProductPatch {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn given_ids_must_match_images() {
        let images = vec!["a".to_string(), "b".to_string()];
        assert_eq!(initial_public_ids(&images, None).unwrap(), vec!["", ""]);
        assert!(initial_public_ids(&images, Some(vec!["x".into()])).is_err());
        assert_eq!(
            initial_public_ids(&images, Some(vec!["x".into(), "y".into()])).unwrap(),
            vec!["x", "y"]
        );
    }

    #[test]
    fn rename_regenerates_slug() {
        let mut p = product(&[], &[]);
        apply_patch(&mut p, patch(json!({"name": "  Galaxy S24 Ultra "}))).unwrap();
        assert_eq!(p.name, "Galaxy S24 Ultra");
        assert_eq!(p.slug, "galaxy-s24-ultra");

        assert!(apply_patch(&mut p, patch(json!({"name": "   "}))).is_err());
    }

    #[test]
    fn prices_accept_strings_and_null_clears_sale() {
        let mut p = product(&[], &[]);
        apply_patch(&mut p, patch(json!({"price": "12,50"}))).unwrap();
        assert_eq!(p.price, Decimal::from_str("12.50").unwrap());
        assert_eq!(p.sale_price, Some(Decimal::from(90)));

        apply_patch(&mut p, patch(json!({"salePrice": null}))).unwrap();
        assert_eq!(p.sale_price, None);

        let err = apply_patch(&mut p, patch(json!({"price": "abc"}))).unwrap_err();
        assert!(matches!(err, ServiceError::Invalid { ref field, .. } if field == "price"));
    }

    #[test]
    fn replacing_images_keeps_known_ids() {
        let mut p = product(&["u1", "u2"], &["id1", "id2"]);
        apply_patch(&mut p, patch(json!({"images": ["u2", "u3"]}))).unwrap();
        assert_eq!(p.images, vec!["u2", "u3"]);
        assert_eq!(p.images_public_ids, vec!["id2", ""]);
    }

    #[test]
    fn ids_without_images_must_match_current_images() {
        let mut p = product(&["u1"], &[""]);
        assert!(apply_patch(&mut p, patch(json!({"imagesPublicIds": ["a", "b"]}))).is_err());
        apply_patch(&mut p, patch(json!({"imagesPublicIds": ["a"]}))).unwrap();
        assert_eq!(p.images_public_ids, vec!["a"]);
    }

    #[test]
    fn fields_outside_the_patch_are_ignored() {
        let mut p = product(&[], &[]);
        let category = p.category_id;
        apply_patch(&mut p, patch(json!({"categoryId": Uuid::new_v4(), "tenantId": Uuid::new_v4()}))).unwrap();
        assert_eq!(p.category_id, category);
    }

    #[test]
    fn public_ids_must_sit_in_the_tenant_folder() {
        let prefix = "tenants/mine/";
        let ids = vec!["tenants/mine/products/p/a".to_string(), String::new()];
        assert!(ensure_tenant_public_ids(&ids, prefix).is_ok());

        let ids = vec!["tenants/mine/a".to_string(), "tenants/theirs/products/p/b".to_string()];
        assert!(matches!(ensure_tenant_public_ids(&ids, prefix), Err(ServiceError::Forbidden(_))));
        // a sibling tenant id sharing the prefix text still needs the separator
        assert!(ensure_tenant_public_ids(&["tenants/mine-2/a".to_string()], prefix).is_err());
    }

    fn lazy_service() -> ProductService {
        ProductService::new(lazy_pool(), Arc::new(FakeMediaStore::configured()), "tenants")
    }

    #[tokio::test]
    async fn foreign_public_ids_are_refused_before_any_query() {
        let tenant = Uuid::new_v4();
        let input: ProductInput = serde_json::from_value(json!({
            "name": "Widget",
            "price": 1,
            "images": ["https://res.cloudinary.com/demo/image/upload/v1/tenants/other/products/p/img.jpg"],
            "imagesPublicIds": ["tenants/other/products/p/img"]
        }))
        .unwrap();
        let err = lazy_service().create(tenant, input).await.unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));

        let err = lazy_service()
            .update(tenant, Uuid::new_v4(), patch(json!({"imagesPublicIds": ["tenants/other/x"]})))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));
    }

    #[tokio::test]
    async fn delete_removes_every_image_from_the_media_host() {
        let Some(pool) = database_pool().await else {
            return;
        };
        let tenant = new_tenant(&pool).await;
        let store = Arc::new(FakeMediaStore::configured());
        let service = ProductService::new(pool.clone(), store.clone(), "tenants");

        let stored = format!("tenants/{}/products/p/stored", tenant);
        let derived_url = format!("https://res.cloudinary.com/demo/image/upload/v7/tenants/{}/products/p/derived.jpg", tenant);
        let input: ProductInput = serde_json::from_value(json!({
            "name": "Camera",
            "price": "250",
            "images": ["https://res.cloudinary.com/demo/image/upload/v7/stored.jpg", derived_url],
            "imagesPublicIds": [stored, ""]
        }))
        .unwrap();
        let product = service.create(tenant, input).await.unwrap();

        let deleted = service.delete(tenant, product.id).await.unwrap();
        assert_eq!(deleted.images_deleted + deleted.images_failed, 2);

        let mut destroyed = store.destroyed();
        destroyed.sort();
        assert_eq!(
            destroyed,
            vec![
                format!("tenants/{}/products/p/derived", tenant),
                format!("tenants/{}/products/p/stored", tenant),
            ]
        );
        assert!(matches!(service.owned(tenant, product.id).await, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn legacy_foreign_ids_are_not_deleted() {
        let Some(pool) = database_pool().await else {
            return;
        };
        let tenant = new_tenant(&pool).await;
        let store = Arc::new(FakeMediaStore::configured());
        let service = ProductService::new(pool.clone(), store.clone(), "tenants");

        let input: ProductInput = serde_json::from_value(json!({
            "name": "Old Listing",
            "price": 5,
            "images": ["https://cdn.example.com/img.jpg"]
        }))
        .unwrap();
        let product = service.create(tenant, input).await.unwrap();
        sqlx::query("UPDATE products SET images_public_ids = $2 WHERE id = $1")
            .bind(product.id)
            .bind(vec![format!("tenants/{}/products/p/img", Uuid::new_v4())])
            .execute(&pool)
            .await
            .unwrap();

        let deleted = service.delete(tenant, product.id).await.unwrap();
        assert_eq!(deleted.images_deleted, 0);
        assert!(store.destroyed().is_empty());
    }

    #[tokio::test]
    async fn specs_must_reference_own_spec_groups() {
        let Some(pool) = database_pool().await else {
            return;
        };
        let owner = new_tenant(&pool).await;
        let other = new_tenant(&pool).await;
        let group = SpecGroupService::new(pool.clone())
            .create(other, serde_json::from_value(json!({"title": "Memory", "specs": ["RAM"]})).unwrap())
            .await
            .unwrap();

        let service = ProductService::new(pool.clone(), Arc::new(FakeMediaStore::configured()), "tenants");
        let input = |group_id: Uuid| -> ProductInput {
            serde_json::from_value(json!({
                "name": "Laptop",
                "price": 900,
                "specs": [{"specGroupId": group_id, "specValues": ["16GB"]}]
            }))
            .unwrap()
        };

        assert!(matches!(service.create(owner, input(group.id)).await, Err(ServiceError::Forbidden(_))));
        assert!(matches!(service.create(owner, input(Uuid::new_v4())).await, Err(ServiceError::NotFound(_))));
    }

    #[test]
    fn blank_sale_price_means_no_sale() {
        assert_eq!(sale_price_field(Some(&json!(""))).unwrap(), None);
        assert_eq!(sale_price_field(Some(&json!(5))).unwrap(), Some(Decimal::from(5)));
        assert!(sale_price_field(Some(&json!(-1))).is_err());
    }
}
