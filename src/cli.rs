use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use machina::models::{LogKind, ResolvedFilter, TaskPriority, TaskStatus, UserRole, UserStatus};
use machina::utils::validate_uuid;
use uuid::Uuid;

fn parse_id(s: &str) -> Result<Uuid, String> {
    validate_uuid(s).map_err(|e| e.to_string())
}

#[derive(Parser)]
#[command(name = "machina")]
#[command(about = "Client de maintenance prédictive", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Liste des machines
    Machines,

    /// Détails d'une machine : données capteurs et alertes actives
    Machine {
        #[arg(value_parser = parse_id)]
        id: Uuid,

        #[arg(long, default_value = "false")]
        watch: bool,
    },

    /// Alertes globales
    Alerts {
        /// false (non résolues), true (résolues) ou all
        #[arg(long, default_value = "false")]
        filter: ResolvedFilter,

        #[arg(long, default_value = "false")]
        watch: bool,
    },

    /// Marquer une alerte comme résolue
    Resolve {
        #[arg(value_parser = parse_id)]
        id: Uuid,
    },

    /// Tableau de bord global
    Dashboard {
        #[arg(long, default_value = "false")]
        watch: bool,
    },

    /// Historique des événements
    History {
        #[arg(long)]
        search: Option<String>,

        /// Alert, DataAnomaly, MachineEvent, UserAction ou System
        #[arg(long)]
        kind: Option<LogKind>,

        #[arg(long, default_value = "false")]
        watch: bool,
    },

    /// Tâches de maintenance
    Maintenance {
        #[arg(long)]
        status: Option<TaskStatus>,
    },

    /// Planifier une tâche de maintenance
    Schedule {
        #[arg(long, value_parser = parse_id)]
        machine: Option<Uuid>,

        #[arg(long)]
        description: Option<String>,

        /// AAAA-MM-JJ
        #[arg(long)]
        due: Option<NaiveDate>,

        #[arg(long, default_value = "Moyenne")]
        priority: TaskPriority,

        #[arg(long)]
        assignee: Option<String>,
    },

    /// Marquer une tâche comme terminée
    Complete {
        #[arg(value_parser = parse_id)]
        id: Uuid,
    },

    /// Utilisateurs
    Users {
        #[arg(long)]
        role: Option<UserRole>,
    },

    /// Ajouter un utilisateur
    UserAdd {
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        #[arg(long, default_value = "Technicien")]
        role: UserRole,

        #[arg(long, default_value = "Actif")]
        status: UserStatus,
    },

    /// Modifier un utilisateur
    UserEdit {
        #[arg(value_parser = parse_id)]
        id: Uuid,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        email: Option<String>,

        #[arg(long)]
        role: Option<UserRole>,

        #[arg(long)]
        status: Option<UserStatus>,
    },

    /// Supprimer un utilisateur
    UserDelete {
        #[arg(value_parser = parse_id)]
        id: Uuid,

        /// Ne pas demander de confirmation
        #[arg(long, default_value = "false")]
        yes: bool,
    },

    /// Modèles de machine learning
    Models {
        #[arg(long, default_value = "false")]
        watch: bool,
    },

    /// Détails d'un modèle
    Model { id: String },

    /// Ré-entraîner un modèle
    Retrain {
        id: String,

        /// Chemin des nouvelles données d'entraînement
        #[arg(long)]
        data: String,
    },

    /// Poser une question à l'assistant IA
    Ask {
        question: String,

        #[arg(long, value_parser = parse_id)]
        machine: Option<Uuid>,
    },
}

impl Commands {
    /// 只有删除前需要交互确认
    pub fn auto_confirm(&self) -> bool {
        match self {
            Commands::UserDelete { yes, .. } => *yes,
            _ => true,
        }
    }
}
