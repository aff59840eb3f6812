//! Field-by-field structural comparison of redeclared buffers and resources.
//!
//! The checks never stop at the first difference: every tracked field is
//! compared independently so a failing consolidation reports the complete set
//! of disagreements in one pass.

use crate::program::{BufferReflection, Resource};
use crate::walk::VariableMap;

/// Outcome of comparing a redeclaration against the recorded definition.
#[derive(Debug)]
pub(crate) struct DeclarationCheck {
    matches: bool,
    lines: Vec<String>,
}

impl DeclarationCheck {
    fn new() -> Self {
        Self {
            matches: true,
            lines: Vec::new(),
        }
    }

    fn mismatch(&mut self, what: impl AsRef<str>) {
        self.lines.push(format!("{} mismatch.", what.as_ref()));
        self.matches = false;
    }

    /// Records a diagnostic line without flipping the aggregate result.
    fn note(&mut self, line: String) {
        self.lines.push(line);
    }

    pub(crate) fn matches(&self) -> bool {
        self.matches
    }

    pub(crate) fn report(&self) -> String {
        self.lines.join("\n")
    }
}

/// Compares a later stage's flattened view of a buffer against the recorded
/// definition.
///
/// A variable name that disappeared is logged but does not by itself decide
/// the result; the remaining shared fields are still compared for every
/// variable both views know about.
pub(crate) fn check_buffer_redeclaration(
    prev: &BufferReflection,
    current: &VariableMap,
) -> DeclarationCheck {
    let mut check = DeclarationCheck::new();

    if prev.variables().len() != current.len() {
        check.mismatch("variable count");
    }

    for (name, prev_var) in prev.variables() {
        let Some(var) = current.get(name) else {
            check.note(format!("can't find variable '{name}' in the new definition."));
            continue;
        };
        if prev_var.location != var.location {
            check.mismatch(format!("'{name}' offset"));
        }
        if prev_var.array_size != var.array_size {
            check.mismatch(format!("'{name}' array size"));
        }
        if prev_var.array_stride != var.array_stride {
            check.mismatch(format!("'{name}' array stride"));
        }
        if prev_var.is_row_major != var.is_row_major {
            check.mismatch(format!("'{name}' row major"));
        }
        if prev_var.ty != var.ty {
            check.mismatch(format!("'{name}' type"));
        }
    }

    check
}

/// Compares a later stage's view of a bound resource against the recorded
/// definition. Stage masks are excluded: accumulating them is the point of
/// consolidation.
pub(crate) fn check_resource_redeclaration(prev: &Resource, current: &Resource) -> DeclarationCheck {
    let mut check = DeclarationCheck::new();

    if prev.kind != current.kind {
        check.mismatch("kind");
    }
    if prev.dims != current.dims {
        check.mismatch("dimensions");
    }
    if prev.return_type != current.return_type {
        check.mismatch("return type");
    }
    if prev.bind_point != current.bind_point {
        check.mismatch("bind point");
    }
    if prev.register_space != current.register_space {
        check.mismatch("register space");
    }
    if prev.array_size != current.array_size {
        check.mismatch("array size");
    }

    check
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::program::{BufferKind, ResourceDimensions, ResourceKind, ReturnType};
    use crate::stage::StageFlags;
    use crate::types::VariableType;
    use crate::walk::Variable;

    fn var(ty: VariableType, location: usize) -> Variable {
        Variable {
            ty,
            location,
            array_size: 0,
            array_stride: 0,
            is_row_major: false,
        }
    }

    fn buffer_with(vars: &[(&str, Variable)]) -> BufferReflection {
        let map: VariableMap = vars
            .iter()
            .map(|(name, v)| (name.to_string(), *v))
            .collect();
        BufferReflection::new(
            "test".to_owned(),
            0,
            BufferKind::Constant,
            16,
            vars.len() as u32,
            map,
        )
    }

    fn texture(bind_point: u32) -> Resource {
        Resource {
            name: "tex".to_owned(),
            kind: ResourceKind::Texture,
            dims: ResourceDimensions::Texture2D,
            return_type: ReturnType::Float,
            bind_point,
            register_space: 0,
            array_size: 0,
            stage_mask: StageFlags::empty(),
        }
    }

    #[test]
    fn identical_buffers_match_with_empty_report() {
        let prev = buffer_with(&[("color", var(VariableType::Float4, 0))]);
        let current: VariableMap = [("color".to_owned(), var(VariableType::Float4, 0))].into();

        let check = check_buffer_redeclaration(&prev, &current);
        assert!(check.matches());
        assert_eq!(check.report(), "");
    }

    #[test]
    fn every_differing_field_is_reported() {
        let prev = buffer_with(&[("color", var(VariableType::Float4, 0))]);
        let current: VariableMap = [("color".to_owned(), var(VariableType::Float3, 16))].into();

        let check = check_buffer_redeclaration(&prev, &current);
        assert!(!check.matches());
        let report = check.report();
        assert!(report.contains("'color' offset mismatch."), "{report}");
        assert!(report.contains("'color' type mismatch."), "{report}");
    }

    #[test]
    fn missing_variable_alone_does_not_fail_the_check() {
        let prev = buffer_with(&[
            ("a", var(VariableType::Float4, 0)),
            ("b", var(VariableType::Float4, 16)),
        ]);
        // Same variable count, one renamed entry: the rename is noted, the
        // count check passes, and the surviving variable still compares equal.
        let current: VariableMap = [
            ("a".to_owned(), var(VariableType::Float4, 0)),
            ("c".to_owned(), var(VariableType::Float4, 16)),
        ]
        .into();

        let check = check_buffer_redeclaration(&prev, &current);
        assert!(check.matches());
        assert!(check.report().contains("can't find variable 'b'"));
    }

    #[test]
    fn variable_count_change_fails() {
        let prev = buffer_with(&[("a", var(VariableType::Float4, 0))]);
        let current: VariableMap = [
            ("a".to_owned(), var(VariableType::Float4, 0)),
            ("b".to_owned(), var(VariableType::Float4, 16)),
        ]
        .into();

        let check = check_buffer_redeclaration(&prev, &current);
        assert!(!check.matches());
        assert_eq!(check.report(), "variable count mismatch.");
    }

    #[test]
    fn resource_field_mismatches_accumulate() {
        let prev = texture(0);
        let mut current = texture(2);
        current.dims = ResourceDimensions::TextureCube;

        let check = check_resource_redeclaration(&prev, &current);
        assert!(!check.matches());
        let report = check.report();
        assert!(report.contains("dimensions mismatch."), "{report}");
        assert!(report.contains("bind point mismatch."), "{report}");
        assert!(!report.contains("kind mismatch."), "{report}");
    }

    #[test]
    fn identical_resources_match() {
        let check = check_resource_redeclaration(&texture(1), &texture(1));
        assert!(check.matches());
        assert_eq!(check.report(), "");
    }
}
