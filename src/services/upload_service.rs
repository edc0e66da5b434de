use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::product_service::destroy_best_effort;
use super::{ProductService, ServiceError};
use crate::database::models::Product;
use crate::media::{remove_image, resolve_public_id, tenant_prefix, upload_folder, MediaStore, UploadTicket};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignRequest {
    pub purpose: Option<String>,
    pub product_id: Option<Uuid>,
}

/// Body the browser posts after the media host accepted an upload. The
/// url and id keep the media host's own field names.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompleteRequest {
    #[serde(rename = "productId")]
    pub product_id: Option<Uuid>,
    pub secure_url: Option<String>,
    pub public_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteImageRequest {
    pub product_id: Option<Uuid>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedImage {
    pub success: bool,
    pub product: Product,
    pub deleted_from_media: bool,
}

fn required<'a>(field: &str, value: Option<&'a str>) -> Result<&'a str, ServiceError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ServiceError::BadRequest(format!("{} is required", field))),
    }
}

pub struct UploadService {
    pool: PgPool,
    media: Arc<dyn MediaStore>,
    folder_root: String,
}

impl UploadService {
    pub fn new(pool: PgPool, media: Arc<dyn MediaStore>, folder_root: impl Into<String>) -> Self {
        Self {
            pool,
            media,
            folder_root: folder_root.into(),
        }
    }

    fn products(&self) -> ProductService {
        ProductService::new(self.pool.clone(), self.media.clone(), self.folder_root.clone())
    }

    /// Ticket for a direct browser upload into the tenant's folder
    pub async fn sign(&self, tenant_id: Uuid, request: SignRequest) -> Result<UploadTicket, ServiceError> {
        if let Some(product_id) = request.product_id {
            self.products().owned(tenant_id, product_id).await?;
        }

        let product_id = request.product_id.map(|id| id.to_string());
        let folder = upload_folder(
            &self.folder_root,
            &tenant_id.to_string(),
            request.purpose.as_deref(),
            product_id.as_deref(),
        );

        let ticket = self.media.sign_upload(&folder, Utc::now().timestamp())?;
        tracing::debug!("Signed upload into {} for tenant {}", folder, tenant_id);
        Ok(ticket)
    }

    /// Append an uploaded image and its public id to the product
    pub async fn complete(&self, tenant_id: Uuid, request: CompleteRequest) -> Result<Product, ServiceError> {
        let product_id = request
            .product_id
            .ok_or_else(|| ServiceError::BadRequest("productId is required".to_string()))?;
        let secure_url = required("secure_url", request.secure_url.as_deref())?;
        let public_id = required("public_id", request.public_id.as_deref())?;

        if !public_id.starts_with(&tenant_prefix(&self.folder_root, tenant_id)) {
            tracing::warn!("Tenant {} tried to attach foreign image {}", tenant_id, public_id);
            return Err(ServiceError::Forbidden("Image does not belong to this store".to_string()));
        }

        self.products().owned(tenant_id, product_id).await?;

        // pads legacy rows whose ids fell behind their urls so the new pair lines up
        let product = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products
            SET images_public_ids = array_append(
                    array_cat(
                        COALESCE(images_public_ids[1:cardinality(images)], '{}'),
                        array_fill(''::text, ARRAY[GREATEST(cardinality(images) - cardinality(images_public_ids), 0)])
                    ),
                    $4
                ),
                images = array_append(images, $3),
                updated_at = now()
            WHERE id = $1 AND tenant_id = $2
            RETURNING *
            "#,
        )
        .bind(product_id)
        .bind(tenant_id)
        .bind(secure_url)
        .bind(public_id)
        .fetch_one(&self.pool)
        .await?;

        tracing::info!("Attached image {} to product {}", public_id, product_id);
        Ok(product)
    }

    /// Remove one image from a product, deleting it from the media host
    /// when possible
    pub async fn delete(&self, tenant_id: Uuid, request: DeleteImageRequest) -> Result<DeletedImage, ServiceError> {
        let product_id = request
            .product_id
            .ok_or_else(|| ServiceError::BadRequest("productId is required".to_string()))?;
        let image_url = required("imageUrl", request.image_url.as_deref())?;

        let product = self.products().owned(tenant_id, product_id).await?;
        if !product.images.iter().any(|url| url == image_url) {
            return Err(ServiceError::NotFound("Image not found on product".to_string()));
        }

        let deleted_from_media = match resolve_public_id(&product.images, &product.images_public_ids, image_url) {
            Some(public_id) => {
                let prefix = tenant_prefix(&self.folder_root, tenant_id);
                destroy_best_effort(self.media.as_ref(), &prefix, &public_id).await
            }
            None => {
                tracing::warn!("Could not derive a public id from {}", image_url);
                false
            }
        };

        let (images, public_ids) = remove_image(&product.images, &product.images_public_ids, image_url);

        let product = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products
            SET images = $3, images_public_ids = $4, updated_at = now()
            WHERE id = $1 AND tenant_id = $2
            RETURNING *
            "#,
        )
        .bind(product_id)
        .bind(tenant_id)
        .bind(&images)
        .bind(&public_ids)
        .fetch_one(&self.pool)
        .await?;

        Ok(DeletedImage {
            success: true,
            product,
            deleted_from_media,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use crate::services::product_service::ProductInput;
    use crate::testing::{database_pool, lazy_pool, new_tenant, FakeMediaStore};
    use axum::http::StatusCode;
    use serde_json::json;

    fn lazy_service(media: FakeMediaStore) -> UploadService {
        UploadService::new(lazy_pool(), Arc::new(media), "tenants")
    }

    #[tokio::test]
    async fn signing_without_credentials_is_unavailable() {
        let err = lazy_service(FakeMediaStore::default())
            .sign(Uuid::new_v4(), SignRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Media(crate::media::MediaError::NotConfigured)));
        assert_eq!(ApiError::from(err).status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn signing_targets_the_tenant_folder() {
        let tenant = Uuid::new_v4();
        let ticket = lazy_service(FakeMediaStore::configured())
            .sign(tenant, SignRequest::default())
            .await
            .unwrap();
        assert_eq!(ticket.folder, format!("tenants/{}/assets", tenant));
        assert!(ticket.folder.starts_with(&tenant_prefix("tenants", tenant)));
    }

    #[tokio::test]
    async fn completing_with_a_foreign_public_id_is_forbidden() {
        let request = CompleteRequest {
            product_id: Some(Uuid::new_v4()),
            secure_url: Some("https://res.cloudinary.com/demo/image/upload/v1/x.jpg".into()),
            public_id: Some(format!("tenants/{}/products/p/x", Uuid::new_v4())),
        };
        let err = lazy_service(FakeMediaStore::configured())
            .complete(Uuid::new_v4(), request)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));
    }

    #[tokio::test]
    async fn completing_requires_every_field() {
        let service = lazy_service(FakeMediaStore::configured());
        let err = service.complete(Uuid::new_v4(), CompleteRequest::default()).await.unwrap_err();
        assert!(matches!(err, ServiceError::BadRequest(_)));

        let request = CompleteRequest {
            product_id: Some(Uuid::new_v4()),
            secure_url: Some("https://res.cloudinary.com/demo/image/upload/v1/x.jpg".into()),
            public_id: None,
        };
        assert!(matches!(service.complete(Uuid::new_v4(), request).await, Err(ServiceError::BadRequest(_))));
    }

    #[tokio::test]
    async fn uploaded_image_is_attached_then_deleted() {
        let Some(pool) = database_pool().await else {
            return;
        };
        let tenant = new_tenant(&pool).await;
        let store = Arc::new(FakeMediaStore::configured());
        let service = UploadService::new(pool.clone(), store.clone(), "tenants");

        let input: ProductInput = serde_json::from_value(json!({"name": "Lamp", "price": 30})).unwrap();
        let product = service.products().create(tenant, input).await.unwrap();

        let public_id = format!("tenants/{}/products/{}/lamp", tenant, product.id);
        let secure_url = format!("https://res.cloudinary.com/demo/image/upload/v3/{}.jpg", public_id);
        let product = service
            .complete(
                tenant,
                CompleteRequest {
                    product_id: Some(product.id),
                    secure_url: Some(secure_url.clone()),
                    public_id: Some(public_id.clone()),
                },
            )
            .await
            .unwrap();
        assert_eq!(product.images, vec![secure_url.clone()]);
        assert_eq!(product.images_public_ids, vec![public_id.clone()]);

        let missing = DeleteImageRequest {
            product_id: Some(product.id),
            image_url: Some("https://res.cloudinary.com/demo/image/upload/v3/other.jpg".into()),
        };
        assert!(matches!(service.delete(tenant, missing).await, Err(ServiceError::NotFound(_))));

        let deleted = service
            .delete(
                tenant,
                DeleteImageRequest {
                    product_id: Some(product.id),
                    image_url: Some(secure_url),
                },
            )
            .await
            .unwrap();
        assert!(deleted.success);
        assert!(deleted.product.images.is_empty());
        assert!(deleted.product.images_public_ids.is_empty());
        assert_eq!(store.destroyed(), vec![public_id]);
    }

    #[tokio::test]
    async fn other_stores_cannot_attach_or_delete_images() {
        let Some(pool) = database_pool().await else {
            return;
        };
        let owner = new_tenant(&pool).await;
        let intruder = new_tenant(&pool).await;
        let store = Arc::new(FakeMediaStore::configured());
        let service = UploadService::new(pool.clone(), store.clone(), "tenants");

        let input: ProductInput = serde_json::from_value(json!({"name": "Desk", "price": 80})).unwrap();
        let product = service.products().create(owner, input).await.unwrap();

        let request = CompleteRequest {
            product_id: Some(product.id),
            secure_url: Some("https://res.cloudinary.com/demo/image/upload/v1/desk.jpg".into()),
            public_id: Some(format!("tenants/{}/products/{}/desk", intruder, product.id)),
        };
        assert!(matches!(service.complete(intruder, request).await, Err(ServiceError::Forbidden(_))));

        let request = DeleteImageRequest {
            product_id: Some(product.id),
            image_url: Some("https://res.cloudinary.com/demo/image/upload/v1/desk.jpg".into()),
        };
        assert!(matches!(service.delete(intruder, request).await, Err(ServiceError::Forbidden(_))));
        assert!(store.destroyed().is_empty());
    }

    #[test]
    fn complete_request_uses_media_host_field_names() {
        let request: CompleteRequest = serde_json::from_value(serde_json::json!({
            "productId": Uuid::nil(),
            "secure_url": "https://res.cloudinary.com/demo/image/upload/v1/a.jpg",
            "public_id": "tenants/x/a"
        }))
        .unwrap();
        assert_eq!(request.product_id, Some(Uuid::nil()));
        assert_eq!(request.public_id.as_deref(), Some("tenants/x/a"));
    }

    #[test]
    fn blank_fields_are_missing() {
        assert!(required("imageUrl", Some("  ")).is_err());
        assert!(required("imageUrl", None).is_err());
        assert_eq!(required("imageUrl", Some(" u ")).unwrap(), "u");
    }
}
