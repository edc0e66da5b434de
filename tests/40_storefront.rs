mod common;

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde_json::{json, Value};

async fn create(client: &reqwest::Client, url: String, token: &str, body: Value) -> Result<Value> {
    let res = client.post(url).bearer_auth(token).json(&body).send().await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = res.json().await?;
    Ok(body["data"].clone())
}

#[tokio::test]
async fn cart_needs_product_ids() -> Result<()> {
    let Some(server) = common::ensure_server().await? else {
        return Ok(());
    };
    let client = reqwest::Client::new();
    let merchant = common::register_merchant(server, &client).await?;
    let cart = format!("{}/store/{}/cart", server.base_url, merchant.slug);

    let res = client.post(&cart).json(&json!({"productIds": []})).send().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client.post(&cart).json(&json!({})).send().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn visits_show_up_in_merchant_traffic() -> Result<()> {
    let Some(server) = common::ensure_server().await? else {
        return Ok(());
    };
    let client = reqwest::Client::new();
    let merchant = common::register_merchant(server, &client).await?;
    let visits = format!("{}/store/{}/visits", server.base_url, merchant.slug);

    for path in ["/", "/products", "/cart"] {
        let res = client
            .post(&visits)
            .json(&json!({"pageType": "page", "pagePath": path, "deviceResolution": "1920x1080"}))
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::CREATED);
    }

    let res = client.post(&visits).json(&json!({"pagePath": "/"})).send().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client
        .get(format!("{}/api/merchant/traffic?page=1", server.base_url))
        .bearer_auth(&merchant.token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["data"]["totalCount"], 3);
    assert_eq!(body["data"]["list"].as_array().context("visit list")?.len(), 3);

    // Past the last page the list is empty but the total stays
    let res = client
        .get(format!("{}/api/merchant/traffic?page=2", server.base_url))
        .bearer_auth(&merchant.token)
        .send()
        .await?;
    let body: Value = res.json().await?;
    assert_eq!(body["data"]["totalCount"], 3);
    assert!(body["data"]["list"].as_array().context("visit list")?.is_empty());

    let res = client
        .get(format!("{}/api/merchant/traffic?page=9223372036854775807", server.base_url))
        .bearer_auth(&merchant.token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn category_nesting_and_tree() -> Result<()> {
    let Some(server) = common::ensure_server().await? else {
        return Ok(());
    };
    let client = reqwest::Client::new();
    let merchant = common::register_merchant(server, &client).await?;
    let categories = format!("{}/api/merchant/categories", server.base_url);

    let root = create(&client, categories.clone(), &merchant.token, json!({"name": "Computers", "url": "computers"})).await?;
    let child = create(
        &client,
        categories.clone(),
        &merchant.token,
        json!({"name": "Laptops", "url": "laptops", "parentId": root["id"]}),
    )
    .await?;
    let grandchild = create(
        &client,
        categories.clone(),
        &merchant.token,
        json!({"name": "Gaming Laptops", "url": "gaming", "parentId": child["id"]}),
    )
    .await?;

    let res = client
        .post(&categories)
        .bearer_auth(&merchant.token)
        .json(&json!({"name": "Too Deep", "url": "too-deep", "parentId": grandchild["id"]}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await?;
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["field_errors"]["parentId"].is_string());

    let res = reqwest::get(format!("{}/store/{}/categories/tree", server.base_url, merchant.slug)).await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    let groups = body["data"].as_array().context("category tree")?;
    let group = groups
        .iter()
        .find(|g| g["group"]["id"] == root["id"])
        .context("root group missing")?;
    assert_eq!(group["categories"][0]["category"]["id"], child["id"]);
    assert_eq!(group["categories"][0]["subCategories"][0]["id"], grandchild["id"]);

    // A parent with children cannot be removed
    let res = client
        .delete(format!("{}/{}", categories, child["id"].as_str().context("child id")?))
        .bearer_auth(&merchant.token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let res = client
        .delete(format!("{}/{}", categories, grandchild["id"].as_str().context("grandchild id")?))
        .bearer_auth(&merchant.token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn brands_and_spec_groups_belong_to_their_store() -> Result<()> {
    let Some(server) = common::ensure_server().await? else {
        return Ok(());
    };
    let client = reqwest::Client::new();
    let owner = common::register_merchant(server, &client).await?;
    let intruder = common::register_merchant(server, &client).await?;
    let api = format!("{}/api/merchant", server.base_url);

    let brand = create(&client, format!("{}/brands", api), &owner.token, json!({"name": "Acme"})).await?;
    let brand_url = format!("{}/brands/{}", api, brand["id"].as_str().context("brand id")?);
    let group = create(
        &client,
        format!("{}/spec-groups", api),
        &owner.token,
        json!({"title": "Display", "specs": ["Size", "Resolution"]}),
    )
    .await?;
    let group_url = format!("{}/spec-groups/{}", api, group["id"].as_str().context("spec group id")?);

    for request in [
        client.put(&brand_url).json(&json!({"name": "Stolen"})),
        client.delete(&brand_url),
        client.put(&group_url).json(&json!({"title": "Stolen", "specs": ["Size"]})),
        client.delete(&group_url),
    ] {
        let res = request.bearer_auth(&intruder.token).send().await?;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    let res = client
        .put(&brand_url)
        .bearer_auth(&owner.token)
        .json(&json!({"name": "Acme Labs"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["data"]["name"], "Acme Labs");

    let res = client
        .put(&group_url)
        .bearer_auth(&owner.token)
        .json(&json!({"title": "Screen", "specs": ["Size"]}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await?;
    assert_eq!(body["data"]["title"], "Screen");

    // The storefront lists only the owner's brands
    let res = reqwest::get(format!("{}/store/{}/brands", server.base_url, intruder.slug)).await?;
    let body: Value = res.json().await?;
    let listed = body["data"].as_array().context("brand list")?;
    assert!(listed.iter().all(|b| b["id"] != brand["id"]));

    for url in [&brand_url, &group_url] {
        let res = client.delete(url).bearer_auth(&owner.token).send().await?;
        assert_eq!(res.status(), StatusCode::OK);
        let res = client.delete(url).bearer_auth(&owner.token).send().await?;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }
    Ok(())
}
