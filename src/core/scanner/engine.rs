//! The duplicate scan loop.

use super::{CancelToken, DuplicateGroup, ScanHandle, ScanState};
use crate::core::asset::{Asset, AssetId};
use crate::core::matcher::{MatchStrategy, MetadataMatcher};
use crate::error::ScanError;
use crate::events::ProgressSink;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::thread;
use std::time::Instant;
use tracing::{debug, info};

/// Configuration for the duplicate scanner
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Reject input whose asset ids are not unique before scanning.
    ///
    /// When disabled, non-unique ids are the caller's problem and the
    /// grouping for those assets is unspecified.
    pub reject_duplicate_ids: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            reject_duplicate_ids: true,
        }
    }
}

/// Builder for scanner configuration
pub struct ScannerBuilder {
    config: ScanConfig,
    strategy: Option<Arc<dyn MatchStrategy>>,
}

impl ScannerBuilder {
    pub fn new() -> Self {
        Self {
            config: ScanConfig::default(),
            strategy: None,
        }
    }

    /// Whether to reject non-unique asset ids
    pub fn reject_duplicate_ids(mut self, reject: bool) -> Self {
        self.config.reject_duplicate_ids = reject;
        self
    }

    /// Replace the metadata predicate (test doubles)
    pub fn strategy(mut self, strategy: Arc<dyn MatchStrategy>) -> Self {
        self.strategy = Some(strategy);
        self
    }

    pub fn build(self) -> DuplicateScanner {
        DuplicateScanner {
            config: self.config,
            strategy: self.strategy.unwrap_or_else(|| Arc::new(MetadataMatcher::new())),
        }
    }
}

impl Default for ScannerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Which group each asset owns or belongs to, keyed by id
#[derive(Default)]
struct GroupIndex {
    owners: HashMap<AssetId, usize>,
    members: HashMap<AssetId, usize>,
}

impl GroupIndex {
    fn is_member(&self, id: &AssetId) -> bool {
        self.members.contains_key(id)
    }

    /// True when `owner` represents the group `member` already belongs to
    fn owns_group_of(&self, owner: &AssetId, member: &AssetId) -> bool {
        match (self.owners.get(owner), self.members.get(member)) {
            (Some(owned), Some(joined)) => owned == joined,
            _ => false,
        }
    }
}

/// Finds duplicate groups in an ordered asset sequence.
///
/// The scan is O(N²) predicate calls in the worst case (no duplicates at
/// all). Each call is a handful of field comparisons.
#[derive(Clone)]
pub struct DuplicateScanner {
    config: ScanConfig,
    strategy: Arc<dyn MatchStrategy>,
}

impl DuplicateScanner {
    /// Scanner with the default configuration and metadata predicate
    pub fn new() -> Self {
        ScannerBuilder::new().build()
    }

    pub fn builder() -> ScannerBuilder {
        ScannerBuilder::new()
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Run a scan on the current thread.
    ///
    /// Returns the final state whether the scan completed or was
    /// cancelled; check [`ScanState::cancelled`] to tell them apart. The
    /// only error is a rejected input.
    pub fn scan<S>(
        &self,
        assets: &[Asset],
        cancel: &CancelToken,
        progress: &S,
    ) -> Result<ScanState, ScanError>
    where
        S: ProgressSink + ?Sized,
    {
        let start = Instant::now();

        if self.config.reject_duplicate_ids {
            ensure_unique_ids(assets)?;
        }

        let total = assets.len();
        let mut state = ScanState::new(total);
        let mut index = GroupIndex::default();

        info!(total, strategy = %self.strategy.description(), "Duplicate scan started");
        progress.on_started(total);

        'outer: for (i, to_match) in assets.iter().enumerate() {
            if cancel.is_cancelled() {
                state.cancelled = true;
                break;
            }

            if let Some(group_idx) = self.absorbing_group(&state.groups, to_match) {
                if !index.is_member(&to_match.id) {
                    state.groups[group_idx].members.push(to_match.clone());
                    index.members.insert(to_match.id.clone(), group_idx);
                }
            } else {
                let mut own_group: Option<usize> = None;

                for (j, candidate) in assets.iter().enumerate() {
                    if j == i {
                        continue;
                    }

                    if cancel.is_cancelled() {
                        state.cancelled = true;
                        break 'outer;
                    }

                    // B -> A is recorded, so A -> B must not be; and an
                    // asset belongs to one group at most.
                    if index.owns_group_of(&candidate.id, &to_match.id)
                        || index.is_member(&candidate.id)
                    {
                        continue;
                    }

                    if !self.strategy.is_duplicate(to_match, candidate) {
                        continue;
                    }

                    let group_idx = match own_group {
                        Some(idx) => {
                            state.groups[idx].members.push(candidate.clone());
                            idx
                        }
                        None => {
                            let idx = state.groups.len();
                            state
                                .groups
                                .push(DuplicateGroup::new(to_match.clone(), candidate.clone()));
                            index.owners.insert(to_match.id.clone(), idx);
                            own_group = Some(idx);
                            debug!(representative = %to_match.id, "New duplicate group");
                            idx
                        }
                    };
                    index.members.insert(candidate.id.clone(), group_idx);
                }
            }

            state.processed_count += 1;
            progress.on_progress(state.processed_count, total, state.groups.len());
        }

        let summary = state.summary(start.elapsed().as_millis() as u64);
        info!(
            processed = summary.processed_assets,
            total = summary.total_assets,
            groups = summary.duplicate_groups,
            duplicates = summary.duplicate_count,
            cancelled = summary.cancelled,
            "Duplicate scan finished"
        );
        progress.on_finished(&summary);

        Ok(state)
    }

    /// Run a scan on a background thread.
    ///
    /// `cancel` must be fresh for this scan. The returned handle can also
    /// cancel it, and hands back the final state.
    pub fn spawn<S>(&self, assets: Vec<Asset>, cancel: CancelToken, progress: S) -> ScanHandle
    where
        S: ProgressSink + 'static,
    {
        let worker_cancel = cancel.clone();
        let scanner = self.clone();

        let worker = thread::spawn(move || scanner.scan(&assets, &worker_cancel, &progress));

        ScanHandle::new(cancel, worker)
    }

    /// First group, in discovery order, whose representative matches `asset`
    fn absorbing_group(&self, groups: &[DuplicateGroup], asset: &Asset) -> Option<usize> {
        groups.iter().position(|group| {
            group.representative.id != asset.id
                && self.strategy.is_duplicate(asset, &group.representative)
        })
    }
}

impl Default for DuplicateScanner {
    fn default() -> Self {
        Self::new()
    }
}

fn ensure_unique_ids(assets: &[Asset]) -> Result<(), ScanError> {
    let mut seen = HashSet::with_capacity(assets.len());
    for asset in assets {
        if !seen.insert(&asset.id) {
            return Err(ScanError::DuplicateIdentity {
                id: asset.id.to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::asset::MediaVariantFlags;
    use chrono::{DateTime, TimeZone, Utc};
    use std::sync::Mutex;

    fn ts(secs: i64) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(secs, 0).single()
    }

    fn asset(id: &str, secs: Option<i64>) -> Asset {
        Asset::new(id, secs.and_then(ts), 10, 10)
    }

    fn ids(assets: &[Asset]) -> Vec<&str> {
        assets.iter().map(|a| a.id.as_str()).collect()
    }

    fn scan(assets: &[Asset]) -> ScanState {
        DuplicateScanner::new()
            .scan(assets, &CancelToken::new(), &())
            .unwrap()
    }

    #[test]
    fn finds_single_pair() {
        let assets = vec![asset("A", Some(100)), asset("B", Some(100)), asset("C", Some(200))];

        let state = scan(&assets);

        assert_eq!(state.groups.len(), 1);
        assert_eq!(state.groups[0].representative.id.as_str(), "A");
        assert_eq!(ids(&state.groups[0].members), vec!["B"]);
        assert_eq!(state.total_count, 3);
        assert_eq!(state.processed_count, 3);
        assert!(!state.cancelled);
    }

    #[test]
    fn missing_timestamps_form_no_groups() {
        let assets = vec![asset("A", None), asset("B", None), asset("C", None)];

        let state = scan(&assets);

        assert!(state.groups.is_empty());
        assert_eq!(state.processed_count, 3);
    }

    #[test]
    fn later_matches_are_absorbed_not_regrouped() {
        let assets = vec![asset("A", Some(100)), asset("B", Some(100)), asset("C", Some(100))];

        let state = scan(&assets);

        assert_eq!(state.groups.len(), 1);
        assert_eq!(state.groups[0].representative.id.as_str(), "A");
        assert_eq!(ids(&state.groups[0].members), vec!["B", "C"]);
    }

    #[test]
    fn representative_is_first_of_its_cluster() {
        let assets = vec![
            asset("X", Some(50)),
            asset("A", Some(100)),
            asset("Y", Some(60)),
            asset("B", Some(100)),
            asset("C", Some(100)),
        ];

        let state = scan(&assets);

        assert_eq!(state.groups.len(), 1);
        assert_eq!(state.groups[0].representative.id.as_str(), "A");
        assert_eq!(ids(&state.groups[0].members), vec!["B", "C"]);
    }

    #[test]
    fn variant_siblings_form_separate_groups() {
        let hdr = |id: &str| asset(id, Some(100)).with_variant(MediaVariantFlags::HDR);
        let assets = vec![asset("A", Some(100)), hdr("H1"), asset("B", Some(100)), hdr("H2")];

        let state = scan(&assets);

        assert_eq!(state.groups.len(), 2);
        assert_eq!(state.groups[0].representative.id.as_str(), "A");
        assert_eq!(ids(&state.groups[0].members), vec!["B"]);
        assert_eq!(state.groups[1].representative.id.as_str(), "H1");
        assert_eq!(ids(&state.groups[1].members), vec!["H2"]);
    }

    #[test]
    fn empty_input_completes_without_progress() {
        let ticks = Mutex::new(0usize);
        let sink = |_: usize, _: usize, _: usize| *ticks.lock().unwrap() += 1;

        let state = DuplicateScanner::new()
            .scan(&[], &CancelToken::new(), &sink)
            .unwrap();

        assert!(state.groups.is_empty());
        assert_eq!(state.processed_count, 0);
        assert!(!state.cancelled);
        assert_eq!(*ticks.lock().unwrap(), 0);
    }

    #[test]
    fn single_asset_reports_one_tick() {
        let ticks = Mutex::new(Vec::new());
        let sink = |p: usize, t: usize, g: usize| ticks.lock().unwrap().push((p, t, g));

        let state = DuplicateScanner::new()
            .scan(&[asset("A", Some(1))], &CancelToken::new(), &sink)
            .unwrap();

        assert!(state.groups.is_empty());
        assert_eq!(*ticks.lock().unwrap(), vec![(1, 1, 0)]);
    }

    #[test]
    fn progress_is_strictly_increasing() {
        let assets: Vec<_> = (0..20).map(|i| asset(&format!("a{i}"), Some(i % 4))).collect();
        let ticks = Mutex::new(Vec::new());
        let sink = |p: usize, t: usize, _: usize| ticks.lock().unwrap().push((p, t));

        DuplicateScanner::new()
            .scan(&assets, &CancelToken::new(), &sink)
            .unwrap();

        let ticks = ticks.into_inner().unwrap();
        assert_eq!(ticks.len(), 20);
        for (n, (processed, total)) in ticks.iter().enumerate() {
            assert_eq!(*processed, n + 1);
            assert_eq!(*total, 20);
        }
    }

    #[test]
    fn cancel_after_first_asset_keeps_partial_groups() {
        let assets = vec![
            asset("A", Some(100)),
            asset("B", Some(200)),
            asset("C", Some(300)),
            asset("D", Some(100)),
            asset("E", Some(400)),
        ];
        let cancel = CancelToken::new();
        let sink = |processed: usize, _: usize, _: usize| {
            if processed == 1 {
                cancel.cancel();
            }
        };

        let state = DuplicateScanner::new().scan(&assets, &cancel, &sink).unwrap();

        assert!(state.cancelled);
        assert!(state.processed_count <= 1);
        assert_eq!(state.groups.len(), 1);
        assert_eq!(ids(&state.groups[0].members), vec!["D"]);
        assert!(!state.is_complete());
    }

    #[test]
    fn cancel_before_start_does_nothing() {
        let cancel = CancelToken::new();
        cancel.cancel();

        let state = DuplicateScanner::new()
            .scan(&[asset("A", Some(1)), asset("B", Some(1))], &cancel, &())
            .unwrap();

        assert!(state.cancelled);
        assert_eq!(state.processed_count, 0);
        assert!(state.groups.is_empty());
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let assets = vec![asset("A", Some(1)), asset("A", Some(1))];

        let result = DuplicateScanner::new().scan(&assets, &CancelToken::new(), &());

        assert!(matches!(
            result,
            Err(ScanError::DuplicateIdentity { ref id }) if id == "A"
        ));
    }

    #[test]
    fn duplicate_id_check_can_be_disabled() {
        let assets = vec![asset("A", Some(1)), asset("A", Some(2))];
        let scanner = DuplicateScanner::builder().reject_duplicate_ids(false).build();

        let state = scanner.scan(&assets, &CancelToken::new(), &()).unwrap();

        assert!(state.groups.is_empty());
    }

    /// Matches neighbours whose numeric ids differ by one, so matching is
    /// not transitive.
    struct AdjacentIds;

    impl MatchStrategy for AdjacentIds {
        fn is_duplicate(&self, a: &Asset, b: &Asset) -> bool {
            let n = |x: &Asset| x.id.as_str().parse::<i64>().unwrap_or(i64::MIN / 2);
            (n(a) - n(b)).abs() == 1
        }

        fn description(&self) -> String {
            "adjacent ids".to_string()
        }
    }

    #[test]
    fn non_transitive_strategy_never_double_books() {
        let assets: Vec<_> = ["1", "2", "3", "4", "5"]
            .iter()
            .map(|id| Asset::new(*id, None, 1, 1))
            .collect();
        let scanner = DuplicateScanner::builder()
            .strategy(Arc::new(AdjacentIds))
            .build();

        let state = scanner.scan(&assets, &CancelToken::new(), &()).unwrap();

        let mut seen = HashSet::new();
        for group in &state.groups {
            for member in &group.members {
                assert_ne!(member.id, group.representative.id);
                assert!(seen.insert(member.id.clone()), "{} booked twice", member.id);
            }
        }
        // "2" is a member, not a representative, so "3" is not absorbed
        // and starts its own group with "4".
        assert_eq!(state.groups.len(), 2);
        assert_eq!(ids(&state.groups[0].members), vec!["2"]);
        assert_eq!(state.groups[1].representative.id.as_str(), "3");
        assert_eq!(ids(&state.groups[1].members), vec!["4"]);
    }
}
