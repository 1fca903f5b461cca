//! Merging participant taste profiles into one aggregate signal.

use super::entities::{TasteProfile, TasteVector};

/// Aggregate taste summary across all participants' profiles.
///
/// Derived data: recomputed from current profiles whenever needed, never
/// stored independently.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MergedSignal {
    /// Cuisine names present in at least ceil(N/2) of the N profiles,
    /// in first-encountered order.
    pub common_cuisines: Vec<String>,
    /// Per-field arithmetic mean of all taste vectors.
    pub average: TasteVector,
    /// Deduplicated union of every profile's ingredients, insertion order.
    pub ingredients: Vec<String>,
}

impl MergedSignal {
    /// First common cuisine, if any consensus exists.
    pub fn leading_cuisine(&self) -> Option<&str> {
        self.common_cuisines.first().map(String::as_str)
    }
}

/// Combine N taste profiles into one [`MergedSignal`].
///
/// Pure and total: defined for any input, deterministic given input order.
/// With a single profile every one of its cuisines is "common" (1 >= ceil(1/2));
/// with an empty slice the signal is empty.
pub fn merge_profiles(profiles: &[TasteProfile]) -> MergedSignal {
    if profiles.is_empty() {
        return MergedSignal::default();
    }

    // Majority cuisines, counted in first-encountered order so ties break
    // toward whichever name appeared first across the inputs.
    let mut counts: Vec<(String, usize)> = Vec::new();
    for profile in profiles {
        for name in profile.cuisine_names() {
            match counts.iter_mut().find(|(n, _)| n == name) {
                Some((_, c)) => *c += 1,
                None => counts.push((name.to_string(), 1)),
            }
        }
    }
    let threshold = profiles.len().div_ceil(2);
    let common_cuisines = counts
        .into_iter()
        .filter(|(_, count)| *count >= threshold)
        .map(|(name, _)| name)
        .collect();

    let n = profiles.len() as f32;
    let average = TasteVector::new(
        profiles.iter().map(|p| p.vector.spice).sum::<f32>() / n,
        profiles.iter().map(|p| p.vector.sweetness).sum::<f32>() / n,
        profiles.iter().map(|p| p.vector.saltiness).sum::<f32>() / n,
        profiles.iter().map(|p| p.vector.sourness).sum::<f32>() / n,
        profiles.iter().map(|p| p.vector.numbing).sum::<f32>() / n,
    );

    let mut ingredients: Vec<String> = Vec::new();
    for profile in profiles {
        for ingredient in &profile.ingredients {
            if !ingredients.contains(ingredient) {
                ingredients.push(ingredient.clone());
            }
        }
    }

    MergedSignal {
        common_cuisines,
        average,
        ingredients,
    }
}
