//! Partition of classified manifests into per-kind buckets.

use crate::manifest::Manifest;
use crate::types::ResourceKind;

/// Manifests grouped by kind. Iteration follows [`ResourceKind::DEPLOY_ORDER`];
/// within a bucket, manifests keep the order they were added in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeploymentBatch {
    buckets: [Vec<Manifest>; 5],
}

impl DeploymentBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_manifests(manifests: impl IntoIterator<Item = Manifest>) -> Self {
        let mut batch = Self::new();
        for manifest in manifests {
            batch.push(manifest);
        }
        batch
    }

    /// Add a manifest to the bucket of its kind.
    pub fn push(&mut self, manifest: Manifest) {
        self.buckets[manifest.kind().order()].push(manifest);
    }

    pub fn bucket(&self, kind: ResourceKind) -> &[Manifest] {
        &self.buckets[kind.order()]
    }

    /// Non-empty and empty buckets alike, in deploy order.
    pub fn iter(&self) -> impl Iterator<Item = (ResourceKind, &[Manifest])> {
        ResourceKind::DEPLOY_ORDER
            .into_iter()
            .map(move |kind| (kind, self.bucket(kind)))
    }

    /// All manifests in dispatch order.
    pub fn manifests(&self) -> impl Iterator<Item = &Manifest> {
        self.buckets.iter().flatten()
    }

    pub fn len(&self) -> usize {
        self.buckets.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn manifest(name: &str, kind: ResourceKind) -> Manifest {
        Manifest::new(PathBuf::from(name), kind, format!("kind: {kind}\n"))
    }

    #[test]
    fn iterates_in_deploy_order_regardless_of_input_order() {
        let batch = DeploymentBatch::from_manifests([
            manifest("d.yaml", ResourceKind::Dataset),
            manifest("w.yaml", ResourceKind::WebApp),
            manifest("ws.yaml", ResourceKind::Workspace),
            manifest("s.yaml", ResourceKind::Solution),
            manifest("o.yaml", ResourceKind::Organization),
        ]);

        let kinds: Vec<_> = batch.manifests().map(|m| m.kind()).collect();
        assert_eq!(kinds, ResourceKind::DEPLOY_ORDER.to_vec());
        assert_eq!(batch.len(), 5);
    }

    #[test]
    fn keeps_insertion_order_within_bucket() {
        let batch = DeploymentBatch::from_manifests([
            manifest("b.yaml", ResourceKind::Solution),
            manifest("a.yaml", ResourceKind::Solution),
        ]);
        let names: Vec<_> = batch
            .bucket(ResourceKind::Solution)
            .iter()
            .map(|m| m.path().to_path_buf())
            .collect();
        assert_eq!(names, vec![PathBuf::from("b.yaml"), PathBuf::from("a.yaml")]);
    }

    #[test]
    fn empty_batch() {
        let batch = DeploymentBatch::new();
        assert!(batch.is_empty());
        assert_eq!(batch.iter().count(), 5);
        assert!(batch.iter().all(|(_, bucket)| bucket.is_empty()));
    }
}
