use url::Url;
use uuid::Uuid;

/// Folder prefix, with trailing slash, that all of a tenant's uploads live under
pub fn tenant_prefix(root: &str, tenant_id: Uuid) -> String {
    format!("{}/{}/", root, tenant_id)
}

/// Folder a tenant's upload lands in on the media host
pub fn upload_folder(root: &str, tenant_id: &str, purpose: Option<&str>, product_id: Option<&str>) -> String {
    match purpose {
        Some("product") => format!("{}/{}/products/{}", root, tenant_id, product_id.unwrap_or("temp")),
        _ => format!("{}/{}/assets", root, tenant_id),
    }
}

fn is_version_segment(segment: &str) -> bool {
    segment.len() > 1 && segment.starts_with('v') && segment[1..].chars().all(|c| c.is_ascii_digit())
}

/// Recover a public id from a delivery URL such as
/// `https://res.cloudinary.com/<cloud>/image/upload/v123/tenants/t/products/p/abc.jpg`
/// → `tenants/t/products/p/abc`.
pub fn public_id_from_url(image_url: &str) -> Option<String> {
    let segments: Vec<String> = match Url::parse(image_url) {
        Ok(url) => url.path_segments()?.map(str::to_string).collect(),
        // bare paths are still worth a try
        Err(_) => image_url.split('?').next()?.split('/').map(str::to_string).collect(),
    };

    let (last, parents) = segments.split_last()?;
    let public_name = match last.rfind('.') {
        Some(dot) => &last[..dot],
        None => last.as_str(),
    };
    if public_name.is_empty() {
        return None;
    }

    let Some(upload_index) = parents.iter().position(|s| s == "upload") else {
        return Some(public_name.to_string());
    };

    let mut folders = &parents[upload_index + 1..];
    if folders.first().is_some_and(|s| is_version_segment(s)) {
        folders = &folders[1..];
    }

    if folders.is_empty() {
        Some(public_name.to_string())
    } else {
        Some(format!("{}/{}", folders.join("/"), public_name))
    }
}

/// Public id to delete for `image_url`: the aligned stored id when present,
/// else one derived from the URL.
pub fn resolve_public_id(images: &[String], public_ids: &[String], image_url: &str) -> Option<String> {
    images
        .iter()
        .position(|u| u == image_url)
        .and_then(|idx| public_ids.get(idx))
        .filter(|id| !id.is_empty())
        .cloned()
        .or_else(|| public_id_from_url(image_url))
}

/// Drop every occurrence of `image_url` along with the ids at the same
/// positions. The ids are aligned to `images` first, so the result always
/// has one id per kept image.
pub fn remove_image(images: &[String], public_ids: &[String], image_url: &str) -> (Vec<String>, Vec<String>) {
    let aligned = align_public_ids(public_ids.to_vec(), images.len());
    images
        .iter()
        .zip(aligned)
        .filter(|(url, _)| *url != image_url)
        .map(|(url, id)| (url.clone(), id))
        .unzip()
}

/// Ids for a replacement image list: URLs that were already on the product
/// keep their id, new URLs get an empty id.
pub fn realign_public_ids(old_images: &[String], old_ids: &[String], new_images: &[String]) -> Vec<String> {
    new_images
        .iter()
        .map(|url| {
            old_images
                .iter()
                .position(|u| u == url)
                .and_then(|idx| old_ids.get(idx))
                .cloned()
                .unwrap_or_default()
        })
        .collect()
}

/// Pad or trim `ids` so it lines up with `images_len`
pub fn align_public_ids(mut ids: Vec<String>, images_len: usize) -> Vec<String> {
    ids.resize(images_len, String::new());
    ids
}
