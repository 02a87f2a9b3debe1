/// One group of the fixed focus-area taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusAreaGroup {
  pub label: &'static str,
  /// Glyph drawn in the legend and overlay.
  pub icon: &'static str,
  pub areas: &'static [&'static str],
}

/// The five groups, in display order. Every focus area a place can carry
/// belongs to exactly one group; anything else is excluded from group-based
/// display but still shown verbatim in detail text.
pub const FOCUS_AREA_GROUPS: [FocusAreaGroup; 5] = [
  FocusAreaGroup {
    label: "Arts & Culture",
    icon: "\u{2605}",
    areas: &["Sports", "Music", "Arts & Culture", "Performance"],
  },
  FocusAreaGroup {
    label: "Capacity Building",
    icon: "\u{25a4}",
    areas: &[
      "Youth Leadership",
      "Community Leadership",
      "Skills Training",
      "Cradle to Career",
    ],
  },
  FocusAreaGroup {
    label: "Social Systems",
    icon: "\u{273f}",
    areas: &["Care Support Systems", "Social Justice", "Criminal Justice"],
  },
  FocusAreaGroup {
    label: "Economic Development",
    icon: "\u{25c9}",
    areas: &[
      "Economic Opportunity",
      "Retail",
      "Industry",
      "Economic Mobility & Generational Wealthbuilding",
    ],
  },
  FocusAreaGroup {
    label: "Built Environment",
    icon: "\u{2302}",
    areas: &["Housing", "Public Space"],
  },
];

/// Looks up the owning group of a focus area. `None` means the area is
/// unmapped and is left out of group-derived display, it is not an error.
#[must_use]
pub fn group_for_area(area: &str) -> Option<&'static FocusAreaGroup> {
  FOCUS_AREA_GROUPS
    .iter()
    .find(|group| group.areas.contains(&area))
}

/// The distinct groups a project touches, ordered like the taxonomy.
#[must_use]
pub fn groups_for_project(areas: &[String]) -> Vec<&'static FocusAreaGroup> {
  FOCUS_AREA_GROUPS
    .iter()
    .filter(|group| {
      areas
        .iter()
        .any(|area| group.areas.contains(&area.as_str()))
    })
    .collect()
}

/// All focus areas in taxonomy order, for the filter dropdown.
pub fn all_areas() -> impl Iterator<Item = &'static str> {
  FOCUS_AREA_GROUPS
    .iter()
    .flat_map(|group| group.areas.iter().copied())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn every_area_maps_to_exactly_one_group() {
    for area in all_areas() {
      let owners = FOCUS_AREA_GROUPS
        .iter()
        .filter(|g| g.areas.contains(&area))
        .count();
      assert_eq!(owners, 1, "{area} should belong to exactly one group");
    }
  }

  #[test]
  fn unmapped_area_has_no_group() {
    assert!(group_for_area("Space Travel").is_none());
  }

  #[test]
  fn project_groups_follow_taxonomy_order() {
    let areas = vec!["Housing".to_string(), "Music".to_string()];
    let groups = groups_for_project(&areas);
    assert_eq!(
      groups.iter().map(|g| g.label).collect::<Vec<_>>(),
      vec!["Arts & Culture", "Built Environment"]
    );
  }

  #[test]
  fn duplicate_areas_collapse_to_one_group() {
    let areas = vec!["Housing".to_string(), "Public Space".to_string()];
    assert_eq!(groups_for_project(&areas).len(), 1);
  }
}
