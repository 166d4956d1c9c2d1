use crate::cli::Visibility;
use crate::model::ClassMembers;
use std::collections::HashSet;

/// Match priority levels (from highest to lowest priority)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum MatchLevel {
    StartsWithCaseSensitive,
    StartsWithCaseInsensitive,
    ContainsCaseSensitive,
    ContainsCaseInsensitive,
    NoMatch,
}

/// Check how well a pattern matches a subject
fn match_level(subject: &str, pattern: &str) -> MatchLevel {
    // 1. startswith case sensitive
    if subject.starts_with(pattern) {
        return MatchLevel::StartsWithCaseSensitive;
    }

    let subject_lower = subject.to_lowercase();
    let pattern_lower = pattern.to_lowercase();

    // 2. startswith case insensitive
    if subject_lower.starts_with(&pattern_lower) {
        return MatchLevel::StartsWithCaseInsensitive;
    }

    // 3. contains case sensitive
    if subject.contains(pattern) {
        return MatchLevel::ContainsCaseSensitive;
    }

    // 4. contains case insensitive
    if subject_lower.contains(&pattern_lower) {
        return MatchLevel::ContainsCaseInsensitive;
    }

    MatchLevel::NoMatch
}

/// For a single pattern, return the subjects at the best match level that has any matches
fn best_matches<'a>(subjects: impl Iterator<Item = &'a str>, pattern: &str) -> Vec<&'a str> {
    let mut by_level: [Vec<&'a str>; 4] = Default::default();

    for subject in subjects {
        match match_level(subject, pattern) {
            MatchLevel::StartsWithCaseSensitive => by_level[0].push(subject),
            MatchLevel::StartsWithCaseInsensitive => by_level[1].push(subject),
            MatchLevel::ContainsCaseSensitive => by_level[2].push(subject),
            MatchLevel::ContainsCaseInsensitive => by_level[3].push(subject),
            MatchLevel::NoMatch => {}
        }
    }

    by_level.into_iter().find(|level| !level.is_empty()).unwrap_or_default()
}

/// Keep the classes whose names match any pattern at that pattern's best level.
/// Order is preserved; no patterns keeps everything.
pub fn filter_classes(classes: Vec<ClassMembers>, patterns: &[String]) -> Vec<ClassMembers> {
    if patterns.is_empty() {
        return classes;
    }

    let mut matching: HashSet<String> = HashSet::new();
    for pattern in patterns {
        let subjects = classes.iter().map(|c| c.class_name.as_str());
        matching.extend(best_matches(subjects, pattern).into_iter().map(str::to_string));
    }

    classes
        .into_iter()
        .filter(|c| matching.contains(&c.class_name))
        .collect()
}

/// Check if an access modifier passes the visibility filter
fn matches_visibility(access_modifier: &str, visibility: Visibility) -> bool {
    match visibility {
        Visibility::All => true,
        Visibility::Public => access_modifier == "public",
        Visibility::NonPublic => access_modifier != "public",
    }
}

/// Drop fields and methods hidden by the visibility filter, nested classes included
pub fn filter_by_visibility(classes: Vec<ClassMembers>, visibility: Visibility) -> Vec<ClassMembers> {
    if visibility == Visibility::All {
        return classes;
    }
    classes
        .into_iter()
        .map(|class| filter_class(class, visibility))
        .collect()
}

fn filter_class(mut class: ClassMembers, visibility: Visibility) -> ClassMembers {
    class
        .usual_fields
        .retain(|f| matches_visibility(&f.access_modifier, visibility));
    class
        .child_class_fields
        .retain(|f| matches_visibility(&f.access_modifier, visibility));
    class
        .methods
        .retain(|m| matches_visibility(&m.access_modifier, visibility));

    for field in &mut class.child_class_fields {
        if let Some(nested) = field.class_type.take() {
            field.class_type = Some(Box::new(filter_class(*nested, visibility)));
        }
    }
    class
}
