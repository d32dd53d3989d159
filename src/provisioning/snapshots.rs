use crate::config::Snapshots;
use crate::defaults::NAME;
use crate::hcl::Body;

pub(super) const ETCD_SNAPSHOT_CREATE: &str = "etcd_snapshot_create";
pub(super) const ETCD_SNAPSHOT_RESTORE: &str = "etcd_snapshot_restore";

const GENERATION: &str = "generation";
const RESTORE_RKE_CONFIG: &str = "restore_rke_config";

/// Adds the snapshot create/restore requests to an RKE2/K3s `rke_config`.
///
/// Rancher acts on a request only when its generation changes, so each
/// regeneration carries the counters kept on [`Snapshots`]. Generations
/// start at 1.
pub(super) fn set_snapshot_blocks(rke_config: &mut Body, snapshots: &Snapshots) {
    if snapshots.create_snapshot {
        rke_config
            .append_block(ETCD_SNAPSHOT_CREATE, &[])
            .set_attribute(GENERATION, snapshots.create_generation.max(1));
    }

    if snapshots.restore_snapshot {
        let restore = rke_config.append_block(ETCD_SNAPSHOT_RESTORE, &[]);
        restore.set_attribute(GENERATION, snapshots.restore_generation.max(1));
        restore.set_attribute(NAME, &snapshots.snapshot_name);
        restore.set_attribute(RESTORE_RKE_CONFIG, &snapshots.snapshot_restore);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hcl::Value;

    #[test]
    fn test_no_blocks_by_default() {
        let mut body = Body::default();
        set_snapshot_blocks(&mut body, &Snapshots::default());
        assert!(body.is_empty());
    }

    #[test]
    fn test_create_generation_starts_at_one() {
        let mut body = Body::default();
        let snapshots = Snapshots {
            create_snapshot: true,
            ..Default::default()
        };
        set_snapshot_blocks(&mut body, &snapshots);

        let create = body.find_block(ETCD_SNAPSHOT_CREATE, &[]).unwrap().body();
        assert_eq!(create.attribute(GENERATION), Some(&Value::Number(1)));
    }

    #[test]
    fn test_restore_carries_counter() {
        let mut body = Body::default();
        let snapshots = Snapshots {
            create_snapshot: true,
            restore_snapshot: true,
            snapshot_name: "tfp-abcde-etcd-snapshot-1".to_string(),
            snapshot_restore: "all".to_string(),
            create_generation: 1,
            restore_generation: 3,
            ..Default::default()
        };
        set_snapshot_blocks(&mut body, &snapshots);

        let restore = body.find_block(ETCD_SNAPSHOT_RESTORE, &[]).unwrap().body();
        assert_eq!(restore.attribute(GENERATION), Some(&Value::Number(3)));
        assert_eq!(
            restore.attribute(NAME),
            Some(&Value::string("tfp-abcde-etcd-snapshot-1"))
        );
        assert_eq!(restore.attribute(RESTORE_RKE_CONFIG), Some(&Value::string("all")));
    }
}
