//! Cross-DALF name collision resolution.
//!
//! The rule: a candidate `N` collides with an existing name `E` when `E`
//! starts with `N` and the remainder is empty or a pure decimal integer.
//! Colliding candidates are renamed to `N` followed by (match count + 1).
//! Everything here is a pure function over lexicographically ordered input,
//! which is what makes the renames stable across runs.

use std::collections::{BTreeMap, BTreeSet};

use darbind_core::{DamlType, TmplStruct};

/// Whether `existing` blocks `candidate` under the collision rule.
pub fn collides(existing: &str, candidate: &str) -> bool {
    match existing.strip_prefix(candidate) {
        Some("") => true,
        Some(rest) => rest.chars().all(|c| c.is_ascii_digit()),
        None => false,
    }
}

/// Number of already-taken names that collide with `candidate`.
pub fn equal_name_count<'a>(
    taken: impl IntoIterator<Item = &'a String>,
    candidate: &str,
) -> usize {
    taken
        .into_iter()
        .filter(|existing| collides(existing, candidate))
        .count()
}

/// Resolve `candidate` against `taken`: `None` registers it as-is, `Some`
/// carries the suffixed replacement. `taken` is updated either way.
pub fn resolve_name(candidate: &str, taken: &mut BTreeSet<String>) -> Option<String> {
    let count = equal_name_count(taken.iter(), candidate);
    if count == 0 {
        taken.insert(candidate.to_string());
        return None;
    }
    let renamed = format!("{}{}", candidate, count + 1);
    taken.insert(renamed.clone());
    Some(renamed)
}

/// Rename colliding structs of one DALF against the global name set.
///
/// Names are visited in lexicographic order; interfaces are skipped, having
/// been deduplicated when the interface index was built. Returns the
/// original-to-new name mapping for the reference rewrite.
pub fn resolve_collisions(
    structs: &mut BTreeMap<String, TmplStruct>,
    taken: &mut BTreeSet<String>,
) -> BTreeMap<String, String> {
    let mut planned = Vec::new();
    for (name, def) in structs.iter() {
        if def.is_interface {
            continue;
        }
        if let Some(renamed) = resolve_name(name, taken) {
            planned.push((name.clone(), renamed));
        }
    }

    let mut renamed = BTreeMap::new();
    for (orig, new_name) in planned {
        if let Some(mut def) = structs.remove(&orig) {
            def.name = new_name.clone();
            structs.insert(new_name.clone(), def);
            renamed.insert(orig, new_name);
        }
    }
    renamed
}

/// Rewrite field types and choice argument types that reference a renamed
/// name, preserving any `nullable`/`list of` wrapper markers around it.
pub fn rewrite_references(
    structs: &mut BTreeMap<String, TmplStruct>,
    renamed: &BTreeMap<String, String>,
) {
    if renamed.is_empty() {
        return;
    }

    for def in structs.values_mut() {
        for field in &mut def.fields {
            let canonical = field.ty.canonical_name();
            if let Some(new_name) = renamed.get(&canonical) {
                field.ty = DamlType::Unknown(new_name.clone());
                continue;
            }

            let stripped = strip_wrappers(&canonical);
            if stripped != canonical {
                if let Some(new_name) = renamed.get(stripped) {
                    field.ty =
                        DamlType::Unknown(canonical.replacen(stripped, new_name, 1));
                }
            }
        }

        for choice in &mut def.choices {
            let Some(arg) = &choice.arg_type else {
                continue;
            };
            if let Some(new_name) = renamed.get(&arg.canonical_name()) {
                choice.arg_type = Some(DamlType::Unknown(new_name.clone()));
            }
        }
    }
}

/// Drop one leading `nullable` and one leading `list of` marker.
fn strip_wrappers(canonical: &str) -> &str {
    let stripped = canonical.strip_prefix("nullable ").unwrap_or(canonical);
    stripped.strip_prefix("list of ").unwrap_or(stripped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use darbind_core::{StructKind, TmplChoice, TmplField};

    fn record(name: &str) -> TmplStruct {
        TmplStruct::new(name, "Main", StructKind::Record)
    }

    fn field(name: &str, ty: DamlType) -> TmplField {
        TmplField {
            name: name.to_string(),
            ty,
            raw_form: String::new(),
            is_optional: false,
            is_enum: false,
        }
    }

    #[test]
    fn test_collision_rule() {
        assert!(collides("T", "T"));
        assert!(collides("T2", "T"));
        assert!(collides("T23", "T"));
        assert!(!collides("T2x", "T"));
        assert!(!collides("Token", "T"));
        assert!(!collides("S", "T"));
    }

    #[test]
    fn test_resolve_name_suffixes_by_match_count() {
        let mut taken = BTreeSet::new();
        assert_eq!(resolve_name("T", &mut taken), None);
        assert_eq!(resolve_name("T", &mut taken), Some("T2".to_string()));
        // Both "T" and "T2" now match, so the next collision gets "T3".
        assert_eq!(resolve_name("T", &mut taken), Some("T3".to_string()));
    }

    #[test]
    fn test_resolve_collisions_renames_and_reports() {
        let mut taken = BTreeSet::new();
        taken.insert("T".to_string());

        let mut structs = BTreeMap::new();
        structs.insert("T".to_string(), record("T"));
        structs.insert("Other".to_string(), record("Other"));

        let renamed = resolve_collisions(&mut structs, &mut taken);

        assert_eq!(renamed.get("T"), Some(&"T2".to_string()));
        assert!(structs.contains_key("T2"));
        assert!(!structs.contains_key("T"));
        assert_eq!(structs["T2"].name, "T2");
        assert!(structs.contains_key("Other"));
        assert!(taken.contains("Other"));
        assert!(taken.contains("T2"));
    }

    #[test]
    fn test_interfaces_are_not_renamed() {
        let mut taken = BTreeSet::new();
        taken.insert("IFoo".to_string());

        let mut structs = BTreeMap::new();
        structs.insert(
            "IFoo".to_string(),
            TmplStruct::new("IFoo", "Main", StructKind::Interface),
        );

        let renamed = resolve_collisions(&mut structs, &mut taken);
        assert!(renamed.is_empty());
        assert!(structs.contains_key("IFoo"));
    }

    #[test]
    fn test_rewrite_preserves_wrappers() {
        let mut renamed = BTreeMap::new();
        renamed.insert("T".to_string(), "T2".to_string());

        let mut structs = BTreeMap::new();
        let mut rec = record("Holder");
        rec.fields.push(field("plain", DamlType::Unknown("T".to_string())));
        rec.fields.push(field(
            "opt",
            DamlType::Optional(Box::new(DamlType::Unknown("T".to_string()))),
        ));
        rec.fields.push(field(
            "many",
            DamlType::List(Box::new(DamlType::Unknown("T".to_string()))),
        ));
        rec.fields.push(field("unrelated", DamlType::Int64));
        structs.insert("Holder".to_string(), rec);

        rewrite_references(&mut structs, &renamed);

        let fields = &structs["Holder"].fields;
        assert_eq!(fields[0].ty.canonical_name(), "T2");
        assert_eq!(fields[1].ty.canonical_name(), "nullable T2");
        assert_eq!(fields[2].ty.canonical_name(), "list of T2");
        assert_eq!(fields[3].ty.canonical_name(), "Int64");
    }

    #[test]
    fn test_rewrite_choice_arguments() {
        let mut renamed = BTreeMap::new();
        renamed.insert("Offer".to_string(), "Offer2".to_string());

        let mut structs = BTreeMap::new();
        let mut tmpl = TmplStruct::new("W", "Main", StructKind::Template);
        tmpl.choices.push(TmplChoice {
            name: "Accept".to_string(),
            arg_type: Some(DamlType::Unknown("Offer".to_string())),
            interface_name: None,
            interface_daml_name: None,
        });
        tmpl.choices.push(TmplChoice {
            name: "Archive".to_string(),
            arg_type: Some(DamlType::Unit),
            interface_name: None,
            interface_daml_name: None,
        });
        structs.insert("W".to_string(), tmpl);

        rewrite_references(&mut structs, &renamed);

        let choices = &structs["W"].choices;
        assert_eq!(
            choices[0].arg_type.as_ref().unwrap().canonical_name(),
            "Offer2"
        );
        assert_eq!(choices[1].arg_type.as_ref().unwrap().canonical_name(), "Unit");
    }

    #[test]
    fn test_rename_idempotence_on_reseeded_name_set() {
        let build = || {
            let mut structs = BTreeMap::new();
            structs.insert("A".to_string(), record("A"));
            structs.insert("B".to_string(), record("B"));
            structs
        };

        let mut taken = BTreeSet::new();
        let mut first = build();
        resolve_collisions(&mut first, &mut taken);

        let mut taken = BTreeSet::new();
        let mut second = build();
        resolve_collisions(&mut second, &mut taken);

        assert_eq!(
            first.keys().collect::<Vec<_>>(),
            second.keys().collect::<Vec<_>>()
        );
    }
}
