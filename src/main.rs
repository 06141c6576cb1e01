//! Machina - 预测性维护监控客户端
//!
//! 命令行入口：每个子命令对应一个页面

mod cli;

use anyhow::Context;
use chrono_tz::Tz;
use clap::Parser;
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cli::{Cli, Commands};
use machina::{
    api::{HttpApiClient, MaintenanceApi},
    config::{LoggingSettings, Settings},
    models::{ScheduleTaskForm, UserForm},
    render,
    services::{
        AlertsController, AssistantSession, DashboardController, HistoryController,
        HistoryFilter, MLModelsController, MachineDetailsController, MachineListController,
        MaintenanceController, SimulatedModelProvider, UsersController, ViewContext,
    },
    sync::{Confirmer, Notifier, PollingSource},
    AppError,
};

/// 提示直接写到标准错误
struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, message: &str) {
        eprintln!("{}", message);
    }
}

/// 从标准输入读取 o/oui/y/yes
struct ConsoleConfirmer {
    assume_yes: bool,
}

impl Confirmer for ConsoleConfirmer {
    fn confirm(&self, prompt: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        print!("{} [o/N] ", prompt);
        if io::stdout().flush().is_err() {
            return false;
        }
        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_lowercase().as_str(), "o" | "oui" | "y" | "yes")
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载环境变量
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // 加载配置
    let settings = Settings::load().context("配置加载失败")?;

    // 初始化日志
    init_tracing(&settings.logging);

    info!("🏭 Machina 客户端启动中...");
    info!(base_url = %settings.api.base_url, "✅ 配置加载完成");

    let tz = settings.timezone()?;
    let api: Arc<dyn MaintenanceApi> = Arc::new(HttpApiClient::new(&settings.api)?);
    let ctx = ViewContext::new(
        api,
        Arc::new(ConsoleNotifier),
        Arc::new(ConsoleConfirmer {
            assume_yes: cli.command.auto_confirm(),
        }),
        &settings,
    );

    run(cli.command, ctx, &tz).await?;
    Ok(())
}

async fn run(command: Commands, ctx: ViewContext, tz: &Tz) -> Result<(), AppError> {
    match command {
        Commands::Machines => {
            let list = MachineListController::new(&ctx);
            let _ = list.load().await;
            println!("{}", render::machines(&list.state(), list.selected_id()));
        }

        Commands::Machine { id, watch } => {
            let list = MachineListController::new(&ctx);
            list.load().await?;
            list.select(id)?;
            let details = MachineDetailsController::new(ctx.clone());
            details.set_machine(list.selected_machine());
            let frame = || {
                details
                    .machine()
                    .map(|machine| {
                        render::machine_details(
                            &machine,
                            details.health(),
                            details.summary().as_ref(),
                            &details.threshold_breaches(),
                            &details.sensor_data().snapshot(),
                            &details.alerts().snapshot(),
                            tz,
                        )
                    })
                    .unwrap_or_default()
            };
            if watch {
                let mut sensor = details.sensor_data().subscribe();
                let mut alerts = details.alerts().subscribe();
                details.activate();
                print_frame(&frame());
                loop {
                    tokio::select! {
                        changed = sensor.changed() => if changed.is_err() { break },
                        changed = alerts.changed() => if changed.is_err() { break },
                        _ = tokio::signal::ctrl_c() => break,
                    }
                    print_frame(&frame());
                }
                details.deactivate();
                info!("👋 已停止刷新");
            } else {
                let _ = details.refresh().await;
                println!("{}", frame());
            }
        }

        Commands::Alerts { filter, watch } => {
            let alerts = AlertsController::new(ctx.clone());
            alerts.set_filter(filter);
            show(alerts.source(), watch, || render::alerts(&alerts.state(), tz)).await;
        }

        Commands::Resolve { id } => {
            let alerts = AlertsController::new(ctx.clone());
            let _ = alerts.refresh().await;
            alerts.resolve(id).await?;
            println!("{}", render::alerts(&alerts.state(), tz));
        }

        Commands::Dashboard { watch } => {
            let dashboard = DashboardController::new(&ctx);
            show(dashboard.source(), watch, || {
                render::dashboard(&dashboard.state(), &dashboard.overview(), tz)
            })
            .await;
        }

        Commands::History {
            search,
            kind,
            watch,
        } => {
            let history = HistoryController::new(&ctx);
            history.set_filter(HistoryFilter {
                search: search.unwrap_or_default(),
                kind,
            });
            show(history.source(), watch, || render::history(&history.state(), tz)).await;
        }

        Commands::Maintenance { status } => {
            let maintenance = MaintenanceController::new(ctx.clone());
            maintenance.set_status_filter(status);
            let _ = maintenance.load().await;
            println!("{}", render::tasks(&maintenance.state()));
        }

        Commands::Schedule {
            machine,
            description,
            due,
            priority,
            assignee,
        } => {
            let maintenance = MaintenanceController::new(ctx.clone());
            let _ = maintenance.load().await;
            maintenance
                .schedule(ScheduleTaskForm {
                    machine_id: machine,
                    description: description.unwrap_or_default(),
                    due_date: due,
                    priority,
                    assigned_to: assignee.unwrap_or_default(),
                })
                .await?;
            println!("{}", render::tasks(&maintenance.state()));
        }

        Commands::Complete { id } => {
            let maintenance = MaintenanceController::new(ctx.clone());
            let _ = maintenance.load().await;
            maintenance.complete(id).await?;
            println!("{}", render::tasks(&maintenance.state()));
        }

        Commands::Users { role } => {
            let users = UsersController::new(ctx.clone());
            users.set_role_filter(role);
            let _ = users.load().await;
            println!("{}", render::users(&users.state()));
        }

        Commands::UserAdd {
            name,
            email,
            role,
            status,
        } => {
            let users = UsersController::new(ctx.clone());
            users
                .create(UserForm {
                    name,
                    email,
                    role,
                    status,
                })
                .await?;
            println!("{}", render::users(&users.state()));
        }

        Commands::UserEdit {
            id,
            name,
            email,
            role,
            status,
        } => {
            let users = UsersController::new(ctx.clone());
            users.load().await?;
            let current = users
                .state()
                .items
                .into_iter()
                .find(|u| u.id == id)
                .ok_or_else(|| AppError::NotFound(format!("用户不存在: {}", id)))?;
            let mut form = UserForm::from_user(&current);
            if let Some(name) = name {
                form.name = name;
            }
            if let Some(email) = email {
                form.email = email;
            }
            if let Some(role) = role {
                form.role = role;
            }
            if let Some(status) = status {
                form.status = status;
            }
            users.update(id, form).await?;
            println!("{}", render::users(&users.state()));
        }

        Commands::UserDelete { id, .. } => {
            let users = UsersController::new(ctx.clone());
            let _ = users.load().await;
            if users.delete(id).await? {
                println!("{}", render::users(&users.state()));
            }
        }

        Commands::Models { watch } => {
            let models = models_controller(&ctx);
            show(models.source(), watch, || render::models(&models.state(), tz)).await;
        }

        Commands::Model { id } => {
            let models = models_controller(&ctx);
            let model = models.details(&id).await?;
            println!("{}", render::model_details(&model, tz));
        }

        Commands::Retrain { id, data } => {
            let models = models_controller(&ctx);
            let model = models.retrain(&id, &data).await?;
            println!("{}", render::model_details(&model, tz));
        }

        Commands::Ask { question, machine } => {
            let session = AssistantSession::new(ctx.api.clone());
            if let Some(id) = machine {
                let list = MachineListController::new(&ctx);
                list.load().await?;
                list.select(id)?;
                session.select_machine(list.selected_machine().map(|m| m.to_ref()));
            }
            session.send(&question).await?;
            println!("{}", render::transcript(&session.messages(), tz));
        }
    }
    Ok(())
}

fn models_controller(ctx: &ViewContext) -> MLModelsController {
    MLModelsController::new(ctx.clone(), Arc::new(SimulatedModelProvider::new()))
}

/// 渲染一次；`watch` 时持续轮询并在每次状态变化后重绘，直到 Ctrl-C
async fn show<T, F>(source: &Arc<PollingSource<T>>, watch: bool, frame: F)
where
    T: Clone + Send + Sync + 'static,
    F: Fn() -> String,
{
    if !watch {
        let _ = source.refresh().await;
        println!("{}", frame());
        return;
    }

    let mut changes = source.subscribe();
    source.activate();
    print_frame(&frame());
    loop {
        tokio::select! {
            changed = changes.changed() => if changed.is_err() { break },
            _ = tokio::signal::ctrl_c() => break,
        }
        print_frame(&frame());
    }
    source.deactivate();
    info!(source = source.name(), "👋 已停止刷新");
}

fn print_frame(frame: &str) {
    println!("\x1B[2J\x1B[H{}", frame);
    let _ = io::stdout().flush();
}

/// 初始化日志系统
fn init_tracing(logging: &LoggingSettings) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let registry = tracing_subscriber::registry().with(env_filter);
    if logging.format == "json" {
        registry
            .with(fmt::layer().json().with_writer(io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_writer(io::stderr))
            .init();
    }
}
