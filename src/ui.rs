//! Saída de terminal do sapateiro: spinner e impressão colorida.
//!
//! Usa `indicatif` para o spinner enquanto uma requisição está em andamento e
//! `console` para as cores.

use chrono::Utc;
use console::Style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::api::Funcionario;
use crate::board::BoardProjection;
use crate::dashboard::{KpiSummary, OverdueOrder, SectorStatistics, Severity};
use crate::error::SapateiroError;
use crate::flow::{Pedido, SectorCatalog, SectorTransition, StageProgress, StageStatus, format_hours};
use crate::session::UserInfo;
use crate::tracker::TransitionReport;

/// Spinner shown while the backend answers.
pub struct Spinner {
    pb: ProgressBar,
}

impl Spinner {
    pub fn start(message: &str) -> Self {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.set_message(message.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        Self { pb }
    }

    pub fn finish(self) {
        self.pb.finish_and_clear();
    }
}

fn bold() -> Style {
    Style::new().bold()
}

fn dim() -> Style {
    Style::new().dim()
}

/// Nearest 256-color cube entry for a `#rgb` / `#rrggbb` sector color.
/// Unreadable colors fall back to the default terminal color.
fn hex_color(hex: &str) -> Option<u8> {
    let hex = hex.trim().trim_start_matches('#');
    let channels: Vec<u8> = match hex.len() {
        3 => hex
            .chars()
            .map(|c| c.to_digit(16).map(|v| v as u8 * 17))
            .collect::<Option<_>>()?,
        6 => (0..6)
            .step_by(2)
            .map(|i| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok())
            .collect::<Option<_>>()?,
        _ => return None,
    };
    let level = |v: u8| ((u16::from(v) * 5 + 127) / 255) as u8;
    Some(16 + 36 * level(channels[0]) + 6 * level(channels[1]) + level(channels[2]))
}

fn sector_style(hex: &str) -> Style {
    match hex_color(hex) {
        Some(code) => Style::new().color256(code),
        None => Style::new(),
    }
}

pub fn print_board(board: &BoardProjection<'_>, user: &UserInfo) {
    println!(
        "{} {} {}",
        bold().apply_to(format!("Quadro de {}", user.nome)),
        dim().apply_to(format!("({})", user.role)),
        dim().apply_to(format!("{} pedido(s)", board.total_orders()))
    );
    if board.columns.is_empty() {
        println!("  {}", Style::new().yellow().apply_to("Nenhuma coluna disponível para o seu departamento"));
    }
    for column in &board.columns {
        println!();
        println!(
            "{} {}",
            Style::new().cyan().bold().apply_to(column.name),
            dim().apply_to(format!("[{}]", column.orders.len()))
        );
        for order in &column.orders {
            print_order_line(order);
        }
    }
    if !board.orphans.is_empty() {
        println!();
        println!(
            "{}",
            Style::new().yellow().apply_to(format!("Sem coluna ({})", board.orphans.len()))
        );
        for order in &board.orphans {
            print_order_line(order);
        }
    }
}

fn print_order_line(order: &Pedido) {
    let services = order.services_summary();
    println!(
        "  #{} {} {} {}",
        order.display_code(),
        order.client_display(),
        dim().apply_to(&order.modelo_tenis),
        dim().apply_to(if services.is_empty() { String::new() } else { format!("({services})") })
    );
}

pub fn print_progress(order: &Pedido, stages: &[StageProgress], catalog: &SectorCatalog) {
    println!(
        "{} {}",
        bold().apply_to(format!("Pedido #{}", order.display_code())),
        order.client_display()
    );
    if let Some(created) = order.created() {
        println!("  {}", dim().apply_to(format!("Criado em {created}")));
    }
    let now = Utc::now();
    for stage in stages {
        let name = sector_style(catalog.color(stage.sector)).apply_to(catalog.name(stage.sector));
        let line = match stage.status {
            StageStatus::Completed => {
                let hours = stage.time_in_stage.map(format_hours).unwrap_or_default();
                format!("{} {name} {}", Style::new().green().apply_to("✓"), dim().apply_to(hours))
            }
            StageStatus::Current => {
                let hours = order
                    .setores_historico
                    .open_entry()
                    .map(|e| format_hours(e.time_in_stage(now)))
                    .unwrap_or_default();
                format!(
                    "{} {} {}",
                    Style::new().cyan().apply_to("▶"),
                    bold().apply_to(&name),
                    dim().apply_to(hours)
                )
            }
            StageStatus::Pending => format!("{} {}", dim().apply_to("○"), dim().apply_to(name)),
        };
        println!("  {line}");
    }
    if let Some(funcionario) = &order.funcionario_atual {
        println!("  {}", dim().apply_to(format!("Responsável: {funcionario}")));
    }
}

pub fn print_transition(report: &TransitionReport, catalog: &SectorCatalog) {
    let green = Style::new().green().bold();
    let code = report.order.display_code();
    match &report.transition {
        SectorTransition::Moved { to, .. } => {
            println!("  {} Pedido #{code} movido para {}", green.apply_to("✓"), catalog.name(*to));
        }
        SectorTransition::Finalized { at, .. } => {
            println!("  {} Pedido #{code} finalizado em {}", green.apply_to("✓"), catalog.name(*at));
            println!("  {}", dim().apply_to("O cliente será notificado."));
        }
        SectorTransition::Terminal { .. } => {
            println!(
                "  {} Pedido #{code} já está no último setor do fluxo",
                Style::new().yellow().apply_to("!")
            );
        }
    }
}

pub fn print_status_change(order: &Pedido, action: &str) {
    println!(
        "  {} Pedido #{} {action}",
        Style::new().green().bold().apply_to("✓"),
        order.display_code()
    );
}

pub fn print_statistics(stats: &SectorStatistics) {
    for (_, sector) in stats.sectors() {
        println!(
            "{} {}",
            sector_style(&sector.cor).bold().apply_to(&sector.nome),
            dim().apply_to(sector.pedidos_label())
        );
        for order in &sector.pedidos {
            let code = order.codigo.as_deref().unwrap_or(&order.id);
            let hours = order
                .tempo_no_setor
                .filter(|h| *h > 0.0)
                .map(|h| format!("⏱ {h}h"))
                .unwrap_or_default();
            println!(
                "  #{code} {} {}",
                order.cliente.as_deref().unwrap_or_default(),
                Style::new().yellow().apply_to(hours)
            );
        }
    }
    println!();
    println!("{}", dim().apply_to(format!("Total: {} pedido(s)", stats.total_orders())));
}

pub fn print_overdue(late: &[OverdueOrder], kpis: &KpiSummary) {
    println!(
        "{}  Concluídos: {}  Em processamento: {}  Iniciados: {}  Taxa de conclusão: {}%",
        bold().apply_to(format!("Total: {}", kpis.total)),
        kpis.concluidos,
        kpis.em_processamento,
        kpis.iniciados,
        kpis.taxa_conclusao,
    );
    println!();
    if late.is_empty() {
        println!("  {}", Style::new().green().apply_to("Nenhum pedido atrasado"));
        return;
    }
    for order in late {
        let style = match order.severity() {
            Severity::Leve => Style::new().yellow(),
            Severity::Moderado => Style::new().color256(208),
            Severity::Grave => Style::new().red().bold(),
        };
        println!(
            "  #{} {} {} {} {}",
            order.id,
            order.cliente,
            dim().apply_to(&order.modelo_tenis),
            style.apply_to(order.severity().label()),
            dim().apply_to(format!("{} dia(s), previsto {}", order.dias_atraso, order.data_prevista_entrega))
        );
    }
}

pub fn print_employees(employees: &[Funcionario]) {
    if employees.is_empty() {
        println!("  Nenhum funcionário encontrado");
        return;
    }
    for f in employees {
        let status = if f.ativo {
            Style::new().green().apply_to("ativo")
        } else {
            Style::new().red().apply_to("inativo")
        };
        println!(
            "  {} {} {} {}",
            bold().apply_to(&f.nome),
            dim().apply_to(f.cargo.as_deref().unwrap_or_default()),
            dim().apply_to(f.setor_id.as_deref().unwrap_or_default()),
            status
        );
    }
}

pub fn print_error(err: &SapateiroError) {
    eprintln!("  {} {}", Style::new().red().bold().apply_to("✗"), err.user_message());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sector_colors_map_to_the_256_color_cube() {
        assert_eq!(hex_color("#000000"), Some(16));
        assert_eq!(hex_color("#FFFFFF"), Some(231));
        assert_eq!(hex_color("#ddd"), hex_color("#dddddd"));
        // #2196F3: r=33 -> 1, g=150 -> 3, b=243 -> 5
        assert_eq!(hex_color("#2196F3"), Some(16 + 36 + 18 + 5));
        assert_eq!(hex_color("azul"), None);
        assert_eq!(hex_color("#12345"), None);
        assert_eq!(hex_color("#zzzzzz"), None);
    }
}
