use serde::Serialize;
use uuid::Uuid;

use crate::database::models::Category;

/// Second level of the category tree with its leaf children
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryNode {
    pub category: Category,
    pub sub_categories: Vec<Category>,
}

/// A root category and everything below it
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryGroup {
    pub group: Category,
    pub categories: Vec<CategoryNode>,
}

/// One breadcrumb of a product's category path
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PathEntry {
    pub id: Uuid,
    pub parent_id: Option<Uuid>,
    pub name: String,
    pub url: String,
}

impl From<&Category> for PathEntry {
    fn from(category: &Category) -> Self {
        Self {
            id: category.id,
            parent_id: category.parent_id,
            name: category.name.clone(),
            url: category.url.clone(),
        }
    }
}

fn children_of(rows: &[Category], parent_id: Uuid) -> impl Iterator<Item = &Category> {
    rows.iter().filter(move |row| row.parent_id == Some(parent_id))
}

/// Group a flat category table into root groups, their categories and
/// sub-categories. Rows nested deeper than three levels are not shown.
pub fn build_category_tree(rows: &[Category]) -> Vec<CategoryGroup> {
    rows.iter()
        .filter(|row| row.parent_id.is_none())
        .map(|group| CategoryGroup {
            group: group.clone(),
            categories: children_of(rows, group.id)
                .map(|category| CategoryNode {
                    category: category.clone(),
                    sub_categories: children_of(rows, category.id).cloned().collect(),
                })
                .collect(),
        })
        .collect()
}

/// Breadcrumb path from the root down to `start_id`.
///
/// At most `max_hops` parent links are followed; anything above that is
/// silently cut off. A missing parent ends the walk early.
pub fn category_path(rows: &[Category], start_id: Uuid, max_hops: usize) -> Vec<PathEntry> {
    let mut path = Vec::new();
    let mut current = Some(start_id);
    let mut hops = 0;

    while let Some(id) = current {
        let Some(category) = rows.iter().find(|row| row.id == id) else {
            break;
        };
        path.push(PathEntry::from(category));

        current = category.parent_id;
        if current.is_none() {
            break;
        }
        hops += 1;
        if hops > max_hops {
            break;
        }
    }

    path.reverse();
    path
}

/// Level of `id` in the tree (a root is level 1), or None when unknown.
pub fn category_depth(rows: &[Category], id: Uuid) -> Option<usize> {
    let mut depth = 0;
    let mut current = Some(id);

    while let Some(id) = current {
        let category = rows.iter().find(|row| row.id == id)?;
        depth += 1;
        // cycle guard
        if depth > rows.len() {
            return None;
        }
        current = category.parent_id;
    }

    Some(depth)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn category(name: &str, parent: Option<&Category>) -> Category {
        Category {
            id: Uuid::new_v4(),
            tenant_id: None,
            parent_id: parent.map(|p| p.id),
            name: name.to_string(),
            url: format!("/{}", name.to_lowercase()),
            slug: name.to_lowercase(),
            icon_size: vec![],
            icon_url: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn groups_three_levels() {
        let computers = category("Computers", None);
        let phones = category("Phones", None);
        let laptops = category("Laptops", Some(&computers));
        let gaming = category("Gaming", Some(&laptops));
        let office = category("Office", Some(&laptops));
        let rows = vec![computers.clone(), laptops.clone(), gaming.clone(), phones.clone(), office.clone()];

        let tree = build_category_tree(&rows);

        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].group.id, computers.id);
        assert_eq!(tree[1].group.id, phones.id);
        assert!(tree[1].categories.is_empty());

        let laptops_node = &tree[0].categories[0];
        assert_eq!(laptops_node.category.id, laptops.id);
        let sub_ids: Vec<Uuid> = laptops_node.sub_categories.iter().map(|c| c.id).collect();
        assert_eq!(sub_ids, vec![gaming.id, office.id]);
    }

    #[test]
    fn tree_serializes_with_camel_case_keys() {
        let root = category("Root", None);
        let child = category("Child", Some(&root));
        let value = serde_json::to_value(build_category_tree(&[root, child])).unwrap();
        assert!(value[0]["categories"][0]["subCategories"].is_array());
        assert!(value[0]["group"]["parentId"].is_null());
    }

    #[test]
    fn path_runs_root_first() {
        let root = category("Root", None);
        let mid = category("Mid", Some(&root));
        let leaf = category("Leaf", Some(&mid));
        let rows = vec![leaf.clone(), root.clone(), mid.clone()];

        let path = category_path(&rows, leaf.id, 3);
        let names: Vec<&str> = path.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Root", "Mid", "Leaf"]);
    }

    #[test]
    fn path_truncates_after_max_hops() {
        let mut rows = vec![category("L0", None)];
        for level in 1..7 {
            let parent = rows.last().unwrap().clone();
            rows.push(category(&format!("L{level}"), Some(&parent)));
        }
        let deepest = rows.last().unwrap().id;

        let path = category_path(&rows, deepest, 3);
        let names: Vec<&str> = path.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["L3", "L4", "L5", "L6"]);
    }

    #[test]
    fn path_of_root_or_unknown_category() {
        let root = category("Root", None);
        assert_eq!(category_path(&[root.clone()], root.id, 3).len(), 1);
        assert!(category_path(&[root], Uuid::new_v4(), 3).is_empty());
    }

    #[test]
    fn path_stops_at_missing_parent() {
        let root = category("Root", None);
        let orphan = category("Orphan", Some(&root));
        let path = category_path(&[orphan.clone()], orphan.id, 3);
        assert_eq!(path.len(), 1);
        assert_eq!(path[0].id, orphan.id);
    }

    #[test]
    fn depth_counts_levels() {
        let root = category("Root", None);
        let mid = category("Mid", Some(&root));
        let leaf = category("Leaf", Some(&mid));
        let rows = vec![root.clone(), mid.clone(), leaf.clone()];

        assert_eq!(category_depth(&rows, root.id), Some(1));
        assert_eq!(category_depth(&rows, leaf.id), Some(3));
        assert_eq!(category_depth(&rows, Uuid::new_v4()), None);
    }

    #[test]
    fn depth_detects_cycles() {
        let mut a = category("A", None);
        let b = category("B", Some(&a));
        a.parent_id = Some(b.id);
        assert_eq!(category_depth(&[a.clone(), b], a.id), None);
    }
}
