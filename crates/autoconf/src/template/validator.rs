//! Template root validation.

use super::TemplateLayout;

/// Minimum number of children a template root can have.
pub const MIN_TEMPLATE_CHILDREN: usize = 3;

/// Decide whether a directory with the given children is a template root.
///
/// It must have at least three children and include every leaf named by
/// `layout`. Unrecognized extra children are ignored.
pub fn is_valid_template<S: AsRef<str>>(children: &[S], layout: &TemplateLayout) -> bool {
    if children.len() < MIN_TEMPLATE_CHILDREN {
        return false;
    }

    layout
        .required()
        .iter()
        .all(|required| children.iter().any(|child| child.as_ref() == *required))
}
