//! 快照归并
//!
//! 把所有跟踪分组的实例按 revision 分桶，每个 revision 只解析一次元数据，
//! 再按服务描述归并出导出它的 revision 集合。

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::discovery::instance::{NO_EXPORTED_SERVICES_REVISION, PhysicalInstance};
use crate::discovery::metadata::{MetadataDocument, RevisionSet, ServiceDescriptor};
use crate::discovery::resolver::MetadataResolver;
use crate::error::{ErrorCode, Result};

/// 已挂载元数据文档的实例
#[derive(Debug, Clone)]
pub struct ResolvedInstance {
    pub instance: PhysicalInstance,
    pub metadata: Arc<MetadataDocument>,
}

/// 一轮归并的结果
#[derive(Debug, Default)]
pub struct Reduction {
    /// 本轮观察到的 revision -> 元数据，整体替换上一轮的缓存
    pub revision_to_metadata: HashMap<String, Arc<MetadataDocument>>,
    /// revision -> 实例（保持事件中的顺序）
    pub revision_to_instances: HashMap<String, Vec<ResolvedInstance>>,
    /// 服务描述 -> 导出它的 revision 集合
    pub service_to_revisions: BTreeMap<ServiceDescriptor, RevisionSet>,
    /// 被跳过的实例数
    pub skipped: usize,
    /// 本轮新解析（缓存未命中）的 revision 数
    pub resolved: usize,
}

impl Reduction {
    /// 同一 revision 下的实例
    pub fn instances_of(&self, revision: &str) -> &[ResolvedInstance] {
        self.revision_to_instances
            .get(revision)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// 快照归并器
pub struct SnapshotReducer {
    resolver: Arc<dyn MetadataResolver>,
}

impl SnapshotReducer {
    pub fn new(resolver: Arc<dyn MetadataResolver>) -> Self {
        Self { resolver }
    }

    /// 对全部已知实例做一次归并
    ///
    /// 任意 revision 解析失败都会中止整轮归并并返回错误，调用方不得提交部分结果。
    pub async fn reduce(
        &self,
        all_instances: &BTreeMap<String, Vec<PhysicalInstance>>,
        previous: &HashMap<String, Arc<MetadataDocument>>,
    ) -> Result<Reduction> {
        let mut reduction = Reduction::default();

        for (group, instances) in all_instances {
            for instance in instances {
                let Some(revision) = Self::valid_revision(group, instance) else {
                    reduction.skipped += 1;
                    continue;
                };

                let document = match reduction.revision_to_metadata.get(revision) {
                    Some(document) => document.clone(),
                    None => {
                        let document = match previous.get(revision) {
                            Some(document) => document.clone(),
                            None => {
                                let document = self
                                    .resolver
                                    .resolve(instance, revision)
                                    .await
                                    .inspect_err(|e| {
                                        error!(
                                            group = %group,
                                            instance = %instance.id,
                                            revision,
                                            error = %e,
                                            "failed to resolve revision metadata, aborting reconciliation"
                                        );
                                    })?;
                                reduction.resolved += 1;
                                Arc::new(document)
                            }
                        };
                        for service in document.services() {
                            reduction
                                .service_to_revisions
                                .entry(service.clone())
                                .or_default()
                                .insert(revision);
                        }
                        reduction
                            .revision_to_metadata
                            .insert(revision.to_string(), document.clone());
                        document
                    }
                };

                reduction
                    .revision_to_instances
                    .entry(revision.to_string())
                    .or_default()
                    .push(ResolvedInstance {
                        instance: instance.clone(),
                        metadata: document,
                    });
            }
        }

        debug!(
            revisions = reduction.revision_to_metadata.len(),
            services = reduction.service_to_revisions.len(),
            resolved = reduction.resolved,
            skipped = reduction.skipped,
            "snapshot reduced"
        );
        Ok(reduction)
    }

    /// 取出可用的 revision；元数据缺失或未导出服务的实例返回 `None`
    fn valid_revision<'a>(group: &str, instance: &'a PhysicalInstance) -> Option<&'a str> {
        if instance.metadata.is_none() {
            warn!(
                group,
                instance = %instance.id,
                host = %instance.host,
                code = %ErrorCode::InstanceMetadataMissing,
                "instance metadata is nil, skipping"
            );
            return None;
        }
        match instance.revision() {
            None => {
                warn!(
                    group,
                    instance = %instance.id,
                    host = %instance.host,
                    code = %ErrorCode::InvalidRevision,
                    "instance has no revision, skipping"
                );
                None
            }
            Some(NO_EXPORTED_SERVICES_REVISION) => {
                warn!(
                    group,
                    instance = %instance.id,
                    host = %instance.host,
                    code = %ErrorCode::InvalidRevision,
                    "instance without valid service metadata, skipping"
                );
                None
            }
            Some(revision) => Some(revision),
        }
    }
}
