//! 机器学习模型页面

use crate::errors::AppError;
use crate::models::{
    fetch_errors, mutation_errors, HyperparameterValue, MLModel, ModelStatus, RetrainRequest,
    RETRAIN_PATH_REQUIRED,
};
use crate::sync::{fetcher, mutate_then_refresh, PollingSource, ViewState};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use validator::Validate;

use super::ViewContext;

/// 模型数据来源
///
/// 后端尚未提供模型接口，目前由 `SimulatedModelProvider` 提供固定数据。
#[async_trait]
pub trait ModelProvider: Send + Sync {
    async fn list_models(&self) -> Result<Vec<MLModel>, AppError>;

    async fn get_model(&self, id: &str) -> Result<MLModel, AppError>;

    /// 以新数据集重新训练；模型已在训练中时返回 `Conflict`
    async fn retrain(&self, id: &str, request: &RetrainRequest) -> Result<MLModel, AppError>;
}

/// 内存中的四个参考模型
pub struct SimulatedModelProvider {
    models: Mutex<Vec<MLModel>>,
}

impl SimulatedModelProvider {
    pub fn new() -> Self {
        Self {
            models: Mutex::new(reference_models()),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<MLModel>> {
        self.models.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for SimulatedModelProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ModelProvider for SimulatedModelProvider {
    async fn list_models(&self) -> Result<Vec<MLModel>, AppError> {
        Ok(self.lock().clone())
    }

    async fn get_model(&self, id: &str) -> Result<MLModel, AppError> {
        self.lock()
            .iter()
            .find(|m| m.id == id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("模型不存在: {}", id)))
    }

    async fn retrain(&self, id: &str, request: &RetrainRequest) -> Result<MLModel, AppError> {
        request.validate()?;

        let mut models = self.lock();
        let model = models
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| AppError::NotFound(format!("模型不存在: {}", id)))?;

        if model.is_training() {
            return Err(AppError::Conflict(format!("模型 {} 已在训练中", id)));
        }

        model.status = ModelStatus::Entrainement;
        model.training_logs.push(format!(
            "{} - Ré-entraînement lancé avec {}",
            Utc::now().format("%Y-%m-%d %H:%M:%S"),
            request.training_data_path
        ));
        tracing::info!(model_id = %id, path = %request.training_data_path, "模型开始重新训练");
        Ok(model.clone())
    }
}

fn metrics(pairs: &[(&str, f64)]) -> BTreeMap<String, f64> {
    pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

fn reference_models() -> Vec<MLModel> {
    let at = |y: i32, mo: u32, d: u32, h: u32, mi: u32| {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).single().unwrap_or_default()
    };

    vec![
        MLModel {
            id: "model_1".to_string(),
            name: "Détection d'Anomalies de Température".to_string(),
            algorithm: "Random Forest".to_string(),
            version: "1.2.0".to_string(),
            status: ModelStatus::Actif,
            last_trained: at(2023, 10, 26, 10, 0),
            performance_score: Some(0.92),
            deployed_machines_count: Some(5),
            training_logs: vec![
                "2023-10-26 09:12:00 - Chargement de 120 000 échantillons".to_string(),
                "2023-10-26 10:00:00 - Entraînement terminé".to_string(),
            ],
            evaluation_metrics: metrics(&[("precision", 0.93), ("recall", 0.90), ("f1_score", 0.92)]),
            hyperparameters: BTreeMap::from([
                ("n_estimators".to_string(), HyperparameterValue::Integer(200)),
                ("max_depth".to_string(), HyperparameterValue::Integer(12)),
                ("bootstrap".to_string(), HyperparameterValue::Bool(true)),
            ]),
            feature_importance: metrics(&[
                ("temperature", 0.52),
                ("current", 0.21),
                ("vibration", 0.17),
                ("pressure", 0.10),
            ]),
        },
        MLModel {
            id: "model_2".to_string(),
            name: "Prédiction de Défaillance Vibratoire".to_string(),
            algorithm: "XGBoost".to_string(),
            version: "2.1.0".to_string(),
            status: ModelStatus::Actif,
            last_trained: at(2023, 10, 25, 14, 30),
            performance_score: Some(0.88),
            deployed_machines_count: Some(3),
            training_logs: Vec::new(),
            evaluation_metrics: metrics(&[("auc", 0.91), ("f1_score", 0.88)]),
            hyperparameters: BTreeMap::from([
                ("learning_rate".to_string(), HyperparameterValue::Float(0.05)),
                ("max_depth".to_string(), HyperparameterValue::Integer(6)),
                ("objective".to_string(), HyperparameterValue::Text("binary:logistic".to_string())),
            ]),
            feature_importance: metrics(&[("vibration", 0.61), ("operating_hours", 0.24), ("temperature", 0.15)]),
        },
        MLModel {
            id: "model_3".to_string(),
            name: "Prédiction de Durée de Vie Restante (RUL)".to_string(),
            algorithm: "LSTM Network".to_string(),
            version: "1.0.0".to_string(),
            status: ModelStatus::Entrainement,
            last_trained: at(2023, 10, 27, 8, 15),
            performance_score: None,
            deployed_machines_count: Some(0),
            training_logs: vec!["2023-10-27 08:15:00 - Époque 12/50".to_string()],
            evaluation_metrics: BTreeMap::new(),
            hyperparameters: BTreeMap::from([
                ("epochs".to_string(), HyperparameterValue::Integer(50)),
                ("dropout".to_string(), HyperparameterValue::Float(0.2)),
            ]),
            feature_importance: BTreeMap::new(),
        },
        MLModel {
            id: "model_4".to_string(),
            name: "Détection de Surchauffe Moteur".to_string(),
            algorithm: "Isolation Forest".to_string(),
            version: "1.1.0".to_string(),
            status: ModelStatus::Erreur,
            last_trained: at(2023, 10, 24, 11, 0),
            performance_score: Some(0.75),
            deployed_machines_count: Some(2),
            training_logs: vec!["2023-10-24 11:00:00 - Échec de validation des données".to_string()],
            evaluation_metrics: metrics(&[("precision", 0.71), ("recall", 0.80)]),
            hyperparameters: BTreeMap::from([(
                "contamination".to_string(),
                HyperparameterValue::Float(0.01),
            )]),
            feature_importance: BTreeMap::new(),
        },
    ]
}

/// 模型列表：每 30 秒刷新（训练状态会变化）
pub struct MLModelsController {
    ctx: ViewContext,
    provider: Arc<dyn ModelProvider>,
    source: Arc<PollingSource<MLModel>>,
}

impl MLModelsController {
    pub fn new(ctx: ViewContext, provider: Arc<dyn ModelProvider>) -> Self {
        let list = provider.clone();
        let source = PollingSource::new(
            "ml_models",
            fetch_errors::ML_MODELS,
            Some(ctx.polling.ml_models()),
            fetcher(move || {
                let provider = list.clone();
                async move { provider.list_models().await }
            }),
        );
        Self {
            ctx,
            provider,
            source,
        }
    }

    pub fn source(&self) -> &Arc<PollingSource<MLModel>> {
        &self.source
    }

    pub fn activate(&self) {
        self.source.activate();
    }

    pub fn deactivate(&self) {
        self.source.deactivate();
    }

    pub async fn refresh(&self) -> Result<(), AppError> {
        self.source.refresh().await
    }

    pub fn state(&self) -> ViewState<MLModel> {
        self.source.snapshot()
    }

    pub async fn details(&self, id: &str) -> Result<MLModel, AppError> {
        self.provider.get_model(id).await
    }

    /// 重新训练模型
    pub async fn retrain(&self, id: &str, training_data_path: &str) -> Result<MLModel, AppError> {
        let request = RetrainRequest::new(training_data_path);
        if let Err(e) = request.validate() {
            let err = AppError::from(e);
            self.ctx.notifier.notify(RETRAIN_PATH_REQUIRED);
            return Err(err);
        }

        let model = mutate_then_refresh(
            self.provider.retrain(id, &request),
            &self.source,
            self.ctx.notifier.as_ref(),
            mutation_errors::RETRAIN_MODEL,
        )
        .await?;

        self.ctx.activity.system(format!(
            "Ré-entraînement du modèle \"{}\" version {} lancé.",
            model.name, model.version
        ));
        Ok(model)
    }
}

impl Drop for MLModelsController {
    fn drop(&mut self) {
        self.source.deactivate();
    }
}
