// スキーマ照合サービス
//
// ライブデータベースのテーブル一覧とメタデータストアを比較し、
// 未知のライブテーブルをストアへ取り込み、ライブに存在しない既知テーブルを作成する。
// ストアのロックはパス全体では保持せず、個々のストア操作単位で直列化される。

use crate::adapters::connection::Connection;
use crate::adapters::table_facade::TableFacade;
use crate::core::error::{DatabaseError, ReconcileError};
use crate::core::schema::TableMetadata;
use crate::services::metadata_store::MetadataStore;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// 照合計画
///
/// どちらのリストもテーブル名順に並びます。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcilePlan {
    /// ライブに存在しストアに未登録のテーブル
    pub to_adopt: Vec<String>,
    /// ストアに登録済みでライブに存在しないテーブル
    pub to_create: Vec<String>,
}

impl ReconcilePlan {
    pub fn is_empty(&self) -> bool {
        self.to_adopt.is_empty() && self.to_create.is_empty()
    }
}

/// テーブル単位の失敗が発生した段階
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReconcileStage {
    Adopt,
    Create,
}

impl fmt::Display for ReconcileStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReconcileStage::Adopt => write!(f, "adopt"),
            ReconcileStage::Create => write!(f, "create"),
        }
    }
}

/// テーブル単位の失敗
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconcileFailure {
    pub table: String,
    pub stage: ReconcileStage,
    pub message: String,
}

/// 照合結果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    /// ストアへ取り込んだテーブル
    pub adopted: Vec<String>,
    /// ライブに作成したテーブル
    pub created: Vec<String>,
    /// パス中に消えたためスキップしたテーブル
    pub skipped: Vec<String>,
    pub failures: Vec<ReconcileFailure>,
}

impl ReconcileReport {
    /// 変更が一件も発生しなかったか
    pub fn is_noop(&self) -> bool {
        self.adopted.is_empty() && self.created.is_empty()
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    fn fail(&mut self, table: &str, stage: ReconcileStage, message: impl Into<String>) {
        self.failures.push(ReconcileFailure {
            table: table.to_string(),
            stage,
            message: message.into(),
        });
    }
}

/// スキーマ照合サービス
#[derive(Debug, Clone)]
pub struct SchemaReconciler {
    facade: TableFacade,
    store: Arc<MetadataStore>,
}

impl SchemaReconciler {
    /// 新しいサービスを作成
    pub fn new(facade: TableFacade, store: Arc<MetadataStore>) -> Self {
        Self { facade, store }
    }

    pub fn facade(&self) -> &TableFacade {
        &self.facade
    }

    pub fn store(&self) -> &Arc<MetadataStore> {
        &self.store
    }

    /// 照合計画を計算（何も変更しない）
    pub async fn plan(&self, conn: &dyn Connection) -> Result<ReconcilePlan, DatabaseError> {
        let live: BTreeSet<String> = self.facade.list_tables(conn).await?.into_iter().collect();
        let known = self.store.all_names();

        Ok(ReconcilePlan {
            to_adopt: live.difference(&known).cloned().collect(),
            to_create: known.difference(&live).cloned().collect(),
        })
    }

    /// 照合を1パス実行
    ///
    /// テーブル一覧の取得失敗とストアの永続化失敗はパス全体を中断します。
    /// それ以外のテーブル単位の失敗は記録され、残りのテーブルの処理は継続します。
    pub async fn reconcile(&self, conn: &dyn Connection) -> Result<ReconcileReport, ReconcileError> {
        let plan = self.plan(conn).await?;
        debug!(
            adopt = plan.to_adopt.len(),
            create = plan.to_create.len(),
            "Computed reconcile plan"
        );

        let mut report = ReconcileReport::default();

        for name in &plan.to_adopt {
            self.adopt(conn, name, &mut report).await?;
        }

        for name in &plan.to_create {
            self.create(conn, name, &mut report).await;
        }

        info!(
            adopted = report.adopted.len(),
            created = report.created.len(),
            skipped = report.skipped.len(),
            failed = report.failures.len(),
            "Reconciliation finished"
        );

        Ok(report)
    }

    async fn adopt(
        &self,
        conn: &dyn Connection,
        name: &str,
        report: &mut ReconcileReport,
    ) -> Result<(), ReconcileError> {
        let schema = match self.facade.describe_schema(conn, name).await {
            Ok(schema) if schema.is_empty() => {
                debug!(table = %name, "Table returned an empty description, skipping");
                report.skipped.push(name.to_string());
                return Ok(());
            }
            Ok(schema) => schema,
            Err(e) if e.is_table_not_found() => {
                debug!(table = %name, "Table disappeared before description, skipping");
                report.skipped.push(name.to_string());
                return Ok(());
            }
            Err(e) => {
                warn!(table = %name, error = %e, "Failed to describe table");
                report.fail(name, ReconcileStage::Adopt, e.to_string());
                return Ok(());
            }
        };

        let columns = schema.len();
        self.store.upsert(name, TableMetadata::new(name, schema))?;
        info!(table = %name, columns, "Adopted live table");
        report.adopted.push(name.to_string());
        Ok(())
    }

    async fn create(&self, conn: &dyn Connection, name: &str, report: &mut ReconcileReport) {
        let Some(metadata) = self.store.get(name) else {
            debug!(table = %name, "Table was removed from the store, skipping");
            report.skipped.push(name.to_string());
            return;
        };

        if metadata.schema.creatable_columns().next().is_none() {
            warn!(table = %name, "Stored schema has no creatable columns");
            report.fail(
                name,
                ReconcileStage::Create,
                "stored schema has no creatable columns",
            );
            return;
        }

        match self.facade.create_table(conn, name, &metadata.schema).await {
            Ok(()) => {
                info!(table = %name, "Created table from stored schema");
                report.created.push(name.to_string());
            }
            Err(e) => {
                warn!(table = %name, error = %e, "Failed to create table");
                report.fail(name, ReconcileStage::Create, e.to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_is_empty() {
        assert!(ReconcilePlan::default().is_empty());
        let plan = ReconcilePlan {
            to_adopt: vec!["users".to_string()],
            to_create: vec![],
        };
        assert!(!plan.is_empty());
    }

    #[test]
    fn test_report_helpers() {
        let mut report = ReconcileReport::default();
        assert!(report.is_noop());
        assert!(!report.has_failures());

        report.fail("users", ReconcileStage::Create, "boom");
        assert!(report.has_failures());
        assert_eq!(report.failures[0].stage, ReconcileStage::Create);
        assert_eq!(report.failures[0].stage.to_string(), "create");
        assert!(report.is_noop());
    }

    #[test]
    fn test_failure_serializes_stage_lowercase() {
        let failure = ReconcileFailure {
            table: "users".to_string(),
            stage: ReconcileStage::Adopt,
            message: "boom".to_string(),
        };
        let value = serde_json::to_value(&failure).unwrap();
        assert_eq!(value["stage"], "adopt");
    }
}
