//! 视图的文本渲染（命令行输出）

use crate::models::{
    Alert, ChatMessage, EnrichedAlert, LogEntry, MLModel, Machine, MachineHealth, MaintenanceTask,
    Sender, SensorDataPoint, SensorSummary, ThresholdBreach, User, NOT_AVAILABLE,
};
use crate::services::AlertOverview;
use crate::sync::{ViewPhase, ViewState};
use crate::utils::{format_local, format_local_time};
use chrono_tz::Tz;
use uuid::Uuid;

/// 各页面的加载/空列表文案
pub struct Placeholders {
    pub loading: &'static str,
    pub empty: &'static str,
}

pub const MACHINES: Placeholders = Placeholders {
    loading: "Chargement des machines...",
    empty: "Aucune machine enregistrée.",
};
pub const ALERTS: Placeholders = Placeholders {
    loading: "Chargement des alertes...",
    empty: "Aucune alerte à afficher selon les filtres.",
};
pub const MACHINE_ALERTS: Placeholders = Placeholders {
    loading: "Chargement des alertes...",
    empty: "Aucune alerte active pour cette machine.",
};
pub const SENSOR_DATA: Placeholders = Placeholders {
    loading: "Chargement des données capteurs...",
    empty: "Aucune donnée de capteur sur les dernières 24 heures.",
};
pub const DASHBOARD: Placeholders = Placeholders {
    loading: "Chargement des alertes...",
    empty: "Aucune alerte active détectée sur le parc machines.",
};
pub const HISTORY: Placeholders = Placeholders {
    loading: "Chargement de l'historique...",
    empty: "Aucun événement correspondant à votre recherche ou filtre.",
};
pub const TASKS: Placeholders = Placeholders {
    loading: "Chargement des tâches de maintenance...",
    empty: "Aucune tâche de maintenance à afficher.",
};
pub const USERS: Placeholders = Placeholders {
    loading: "Chargement des utilisateurs...",
    empty: "Aucun utilisateur enregistré.",
};
pub const MODELS: Placeholders = Placeholders {
    loading: "Chargement des modèles ML...",
    empty: "Aucun modèle ML enregistré pour le moment.",
};

/// 按渲染阶段输出列表；出错时在提示下方保留旧数据
pub fn list<T>(state: &ViewState<T>, text: &Placeholders, row: impl Fn(&T) -> String) -> String {
    match state.phase() {
        ViewPhase::Loading => text.loading.to_string(),
        ViewPhase::Empty => text.empty.to_string(),
        ViewPhase::Populated(items) => items.iter().map(row).collect::<Vec<_>>().join("\n"),
        ViewPhase::Error { message, stale } => {
            let mut lines = vec![format!("⚠ {}", message)];
            lines.extend(stale.iter().map(row));
            lines.join("\n")
        }
    }
}

pub fn machine_row(machine: &Machine, selected: Option<Uuid>) -> String {
    let marker = if selected == Some(machine.id) { ">" } else { " " };
    format!(
        "{} {}  {}  [{}]  {}",
        marker,
        machine.name,
        machine.location.as_deref().unwrap_or(NOT_AVAILABLE),
        machine.machine_type.as_deref().unwrap_or(NOT_AVAILABLE),
        machine.id
    )
}

pub fn machines(state: &ViewState<Machine>, selected: Option<Uuid>) -> String {
    list(state, &MACHINES, |m| machine_row(m, selected))
}

pub fn alert_row(enriched: &EnrichedAlert, tz: &Tz) -> String {
    let alert = &enriched.alert;
    let status = if alert.is_resolved { "Résolue" } else { "Active" };
    format!(
        "{}  {:<13} {:<20} {}  ({}, {})  {}",
        format_local(&alert.timestamp, tz),
        alert.severity.to_string(),
        enriched.machine_name,
        alert.message,
        alert.alert_type,
        status,
        alert.id
    )
}

pub fn alerts(state: &ViewState<EnrichedAlert>, tz: &Tz) -> String {
    list(state, &ALERTS, |a| alert_row(a, tz))
}

pub fn dashboard(state: &ViewState<EnrichedAlert>, overview: &AlertOverview, tz: &Tz) -> String {
    let mut lines = vec![format!(
        "Alertes actives : {}  |  Machines en alerte : {}",
        overview.total, overview.machines_in_alert
    )];
    let counts: Vec<String> = overview
        .by_severity
        .iter()
        .map(|(severity, count)| format!("{} : {}", severity, count))
        .collect();
    if !counts.is_empty() {
        lines.push(counts.join("  "));
    }
    lines.push(list(state, &DASHBOARD, |a| alert_row(a, tz)));
    lines.join("\n")
}

pub fn machine_details(
    machine: &Machine,
    health: MachineHealth,
    summary: Option<&SensorSummary>,
    breaches: &[ThresholdBreach],
    sensor_state: &ViewState<SensorDataPoint>,
    alerts_state: &ViewState<Alert>,
    tz: &Tz,
) -> String {
    let mut lines = vec![
        format!("{} ({})", machine.name, machine.id),
        format!(
            "Emplacement : {}  |  Type : {}  |  N° de série : {}",
            machine.location.as_deref().unwrap_or(NOT_AVAILABLE),
            machine.machine_type.as_deref().unwrap_or(NOT_AVAILABLE),
            machine.serial_number.as_deref().unwrap_or(NOT_AVAILABLE)
        ),
        health.to_string(),
    ];

    if !machine.thresholds_config.is_empty() {
        let thresholds: Vec<String> = machine
            .thresholds_config
            .iter()
            .map(|(key, value)| format!("{} = {}", key, value))
            .collect();
        lines.push(format!("Seuils : {}", thresholds.join(", ")));
    }

    lines.push(String::new());
    lines.push("Données capteurs (24 h)".to_string());
    match (sensor_state.phase(), summary) {
        (ViewPhase::Error { message, .. }, _) => lines.push(format!("⚠ {}", message)),
        (ViewPhase::Loading, _) => lines.push(SENSOR_DATA.loading.to_string()),
        (_, None) => lines.push(SENSOR_DATA.empty.to_string()),
        (_, Some(summary)) => {
            lines.push(format!(
                "{} points, du {} au {}",
                summary.points,
                format_local(&summary.first_at, tz),
                format_local(&summary.last_at, tz)
            ));
            for metric in &summary.metrics {
                lines.push(format!(
                    "  {:<12} dernier {:>8.2}  min {:>8.2}  max {:>8.2}  moy {:>8.2}",
                    metric.metric.label(),
                    metric.latest,
                    metric.min,
                    metric.max,
                    metric.mean
                ));
            }
        }
    }
    for breach in breaches {
        lines.push(format!(
            "  ⚠ {} : {:.2} (seuil {:.2})",
            breach.key, breach.value, breach.limit
        ));
    }

    lines.push(String::new());
    lines.push("Alertes actives".to_string());
    lines.push(list(alerts_state, &MACHINE_ALERTS, |alert| {
        format!(
            "  {}  {:<13} {}",
            format_local(&alert.timestamp, tz),
            alert.severity.to_string(),
            alert.message
        )
    }));
    lines.join("\n")
}

pub fn history(state: &ViewState<LogEntry>, tz: &Tz) -> String {
    list(state, &HISTORY, |entry| {
        format!(
            "{}  {:<12} {:<20} {}  [{}]",
            format_local(&entry.timestamp, tz),
            entry.kind.as_str(),
            entry.machine_name.as_deref().unwrap_or(NOT_AVAILABLE),
            entry.message,
            entry
                .severity
                .map(|s| s.to_string())
                .unwrap_or_else(|| NOT_AVAILABLE.to_string())
        )
    })
}

/// 截止日期按日期展示，不做时区换算
pub fn tasks(state: &ViewState<MaintenanceTask>) -> String {
    list(state, &TASKS, |task| {
        format!(
            "{}  {:<10} {:<8} {:<20} {}  ({})  {}",
            task.due_date.format("%d/%m/%Y"),
            task.status.to_string(),
            task.priority.to_string(),
            task.machine_name,
            task.description,
            task.assigned_to.as_deref().unwrap_or(NOT_AVAILABLE),
            task.id
        )
    })
}

pub fn users(state: &ViewState<User>) -> String {
    list(state, &USERS, |user| {
        format!(
            "{:<24} {:<32} {:<15} {:<8} {}",
            user.name,
            user.email,
            user.role.to_string(),
            user.status.to_string(),
            user.id
        )
    })
}

pub fn model_row(model: &MLModel, tz: &Tz) -> String {
    let score = model
        .performance_score
        .map(|s| format!("{:.1}%", s * 100.0))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());
    format!(
        "{:<8} {:<45} {:<17} v{:<6} {:<13} score {:<6} machines {}  entraîné le {}",
        model.id,
        model.name,
        model.algorithm,
        model.version,
        model.status.to_string(),
        score,
        model.deployed_machines_count.unwrap_or(0),
        format_local(&model.last_trained, tz)
    )
}

pub fn models(state: &ViewState<MLModel>, tz: &Tz) -> String {
    list(state, &MODELS, |m| model_row(m, tz))
}

pub fn model_details(model: &MLModel, tz: &Tz) -> String {
    let mut lines = vec![
        format!("Détails du Modèle : {}", model.name),
        model_row(model, tz),
    ];
    if !model.evaluation_metrics.is_empty() {
        lines.push("Métriques d'évaluation :".to_string());
        for (name, value) in &model.evaluation_metrics {
            lines.push(format!("  {} : {:.3}", name, value));
        }
    }
    if !model.hyperparameters.is_empty() {
        lines.push("Hyperparamètres :".to_string());
        for (name, value) in &model.hyperparameters {
            lines.push(format!("  {} : {}", name, value));
        }
    }
    let features = model.ranked_features();
    if !features.is_empty() {
        lines.push("Importance des caractéristiques :".to_string());
        for (name, weight) in features {
            lines.push(format!("  {:<16} {:.2}", name, weight));
        }
    }
    if !model.training_logs.is_empty() {
        lines.push("Journaux d'entraînement :".to_string());
        lines.extend(model.training_logs.iter().map(|l| format!("  {}", l)));
    }
    lines.join("\n")
}

pub fn transcript(messages: &[ChatMessage], tz: &Tz) -> String {
    messages
        .iter()
        .map(|m| {
            let who = match m.sender {
                Sender::User => "Vous",
                Sender::Ai => "Assistant IA",
            };
            format!("[{}] {} : {}", format_local_time(&m.timestamp, tz), who, m.text)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
