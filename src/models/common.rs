//! 通用常量：哨兵值与界面提示文案

/// 告警/仪表盘中无法解析的机器名
pub const UNKNOWN_MACHINE: &str = "Inconnu";
/// 历史记录中缺失字段的占位
pub const NOT_AVAILABLE: &str = "N/A";

/// 加载失败提示
pub mod fetch_errors {
    pub const ALERTS: &str = "Impossible de charger les alertes.";
    pub const GLOBAL_ALERTS: &str = "Impossible de charger les alertes globales.";
    pub const MACHINES: &str = "Impossible de charger la liste des machines.";
    pub const SENSOR_DATA: &str = "Impossible de charger les données des capteurs.";
    pub const MACHINE_ALERTS: &str = "Impossible de charger les alertes.";
    pub const TASKS: &str = "Impossible de charger les tâches de maintenance.";
    pub const USERS: &str = "Impossible de charger la liste des utilisateurs.";
    pub const HISTORY: &str = "Impossible de charger l'historique.";
    pub const ML_MODELS: &str = "Impossible de charger la liste des modèles ML.";
}

/// 写操作失败提示
pub mod mutation_errors {
    pub const RESOLVE_ALERT: &str = "Erreur lors de la résolution de l'alerte.";
    pub const COMPLETE_TASK: &str = "Erreur lors de la mise à jour de la tâche.";
    pub const SCHEDULE_TASK: &str = "Erreur lors de la planification de la tâche.";
    pub const DELETE_USER: &str = "Erreur lors de la suppression de l'utilisateur.";
    pub const RETRAIN_MODEL: &str = "Erreur lors du ré-entraînement du modèle.";
    pub const UNEXPECTED: &str = "Une erreur inattendue est survenue.";
}

/// 成功提示
pub mod notices {
    pub const USER_CREATED: &str = "Utilisateur ajouté avec succès !";
    pub const USER_UPDATED: &str = "Utilisateur modifié avec succès !";
}

pub const MISSING_FIELDS_MESSAGE: &str = "Veuillez remplir tous les champs.";
pub const RETRAIN_PATH_REQUIRED: &str = "Veuillez indiquer le chemin des données d'entraînement.";
pub const DELETE_USER_CONFIRMATION: &str = "Êtes-vous sûr de vouloir supprimer cet utilisateur ?";
pub const ASSISTANT_FAILURE_REPLY: &str =
    "Désolé, une erreur est survenue. Veuillez réessayer plus tard.";
