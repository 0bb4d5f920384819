//! Best-effort selector generation.
//!
//! Produces a locator string for a clicked node: the id when one exists,
//! otherwise a bounded ancestor path of `tag.classes:nth-child(n)` segments
//! joined with the child combinator. The result is a heuristic locator, not
//! guaranteed globally unique, and must never fail, detached nodes included.

use super::dom::Element;

pub fn element_selector(element: &Element, max_depth: usize) -> String {
    if let Some(id) = element.id() {
        return format!("#{id}");
    }

    let mut path: Vec<String> = Vec::new();
    let mut cursor = Some(element.clone());

    while let Some(node) = cursor {
        if node.tag_name().eq_ignore_ascii_case("body") {
            break;
        }

        let mut segment = node.tag_name().to_ascii_lowercase();

        // An identified ancestor anchors the path; nothing above it can make
        // the locator more precise.
        if let Some(id) = node.id() {
            segment.push('#');
            segment.push_str(id);
            path.push(segment);
            break;
        }

        let classes = node.classes();
        if !classes.is_empty() {
            segment.push('.');
            segment.push_str(&classes.join("."));
        }

        if let Some(index) = node.child_index() {
            if index > 0 {
                segment.push_str(&format!(":nth-child({})", index + 1));
            }
        }

        path.push(segment);

        if path.len() >= max_depth {
            break;
        }
        cursor = node.parent();
    }

    if path.is_empty() {
        // The node was <body> itself or had nothing to contribute.
        return element.tag_name().to_ascii_lowercase();
    }

    path.reverse();
    path.join(" > ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEPTH: usize = 5;

    #[test]
    fn id_wins_outright() {
        let element = Element::new("button").with_id("save");
        assert_eq!(element_selector(&element, DEPTH), "#save");
    }

    #[test]
    fn path_carries_classes_and_ordinals() {
        let body = Element::new("body");
        let main = Element::new("main");
        let list = Element::new("ul").with_classes(["items"]);
        let skipped = Element::new("li");
        let target = Element::new("li").with_classes(["item", "active"]);

        body.append(&main);
        main.append(&list);
        list.append(&skipped);
        list.append(&target);

        assert_eq!(
            element_selector(&target, DEPTH),
            "main > ul.items > li.item.active:nth-child(2)"
        );
    }

    #[test]
    fn identified_ancestor_terminates_the_walk() {
        let body = Element::new("body");
        let form = Element::new("form").with_id("checkout");
        let row = Element::new("div").with_classes(["row"]);
        let target = Element::new("span");

        body.append(&form);
        form.append(&row);
        row.append(&target);

        assert_eq!(element_selector(&target, DEPTH), "form#checkout > div.row > span");
    }

    #[test]
    fn walk_is_depth_bounded() {
        let root = Element::new("div");
        let mut current = root.clone();
        for _ in 0..10 {
            let child = Element::new("div");
            current.append(&child);
            current = child;
        }

        let selector = element_selector(&current, DEPTH);
        assert_eq!(selector.split(" > ").count(), DEPTH);
    }

    #[test]
    fn detached_node_never_panics_and_is_nonempty() {
        let orphan = Element::new("span").with_classes(["lonely"]);
        assert_eq!(element_selector(&orphan, DEPTH), "span.lonely");

        let body = Element::new("body");
        assert_eq!(element_selector(&body, DEPTH), "body");
    }
}
