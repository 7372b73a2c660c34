use std::collections::HashSet;

use crate::message::{ProductHit, ResultGroups};

pub const DEFAULT_FLATTEN_LIMIT: usize = 8;

/// Merges grouped hits into one list for card rendering.
///
/// Groups are walked in order, hits within a group in order. The first occurrence of each
/// non-empty id wins and the walk stops as soon as `limit` hits are collected, so a later group
/// can end up under-represented. No re-ranking happens here.
pub fn flatten_results(groups: &ResultGroups, limit: usize) -> Vec<ProductHit> {
	let mut seen = HashSet::new();
	let mut out = Vec::with_capacity(limit.min(DEFAULT_FLATTEN_LIMIT));

	if limit == 0 {
		return out;
	}

	for (_, hits) in groups.iter() {
		for hit in hits {
			let Some(key) = hit.key() else {
				continue;
			};

			if !seen.insert(key) {
				continue;
			}

			out.push(hit.clone());

			if out.len() >= limit {
				return out;
			}
		}
	}

	out
}
