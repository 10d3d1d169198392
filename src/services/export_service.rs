use rust_xlsxwriter::*;
use std::sync::Arc;
use uuid::Uuid;

use crate::database::RecruitingStore;
use crate::error::{Error, Result};
use crate::models::candidate::Candidate;
use crate::models::interview::InterviewTurn;
use crate::models::vacancy::{Vacancy, VacancyStatus};

/// A candidate together with its stored interview transcript.
pub struct CandidateRecord {
    pub candidate: Candidate,
    pub turns: Vec<InterviewTurn>,
}

#[derive(Clone)]
pub struct ExportService {
    store: Arc<dyn RecruitingStore>,
}

impl ExportService {
    pub fn new(store: Arc<dyn RecruitingStore>) -> Self {
        Self { store }
    }

    /// Builds the XLSX report of a vacancy and returns it with a download file name.
    pub async fn export_vacancy(&self, vacancy_id: Uuid) -> Result<(String, Vec<u8>)> {
        let vacancy = self
            .store
            .get_vacancy(vacancy_id)
            .await?
            .ok_or_else(|| Error::NotFound("Vacancy not found".into()))?;

        let mut records = Vec::new();
        for candidate in self.store.list_candidates(vacancy_id).await? {
            let turns = self.store.list_turns(candidate.id).await?;
            records.push(CandidateRecord { candidate, turns });
        }

        let buffer = generate_vacancy_xlsx(&vacancy, &records)?;
        let filename = format!(
            "vacante_{}_{}.xlsx",
            file_stem(&vacancy.title),
            chrono::Utc::now().format("%Y%m%d")
        );
        tracing::info!(vacancy_id = %vacancy_id, candidates = records.len(), "vacancy exported");
        Ok((filename, buffer))
    }
}

fn file_stem(title: &str) -> String {
    let stem: String = title
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect();
    if stem.is_empty() {
        "sin_titulo".to_string()
    } else {
        stem
    }
}

fn or_dash(value: &str) -> &str {
    if value.trim().is_empty() {
        "—"
    } else {
        value
    }
}

/// Generates the "Candidatos" and "Entrevistas" sheets for one vacancy.
pub fn generate_vacancy_xlsx(vacancy: &Vacancy, records: &[CandidateRecord]) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();

    // ── Palette ──
    let primary_color = Color::RGB(0x1E293B);
    let header_bg = Color::RGB(0x0F172A);
    let alt_row_1 = Color::RGB(0xF8FAFC);
    let alt_row_2 = Color::White;
    let border_color = Color::RGB(0xE2E8F0);
    let status_color = match vacancy.status {
        VacancyStatus::Open => Color::RGB(0x10B981),
        VacancyStatus::Closed => Color::RGB(0xEF4444),
    };

    let title_format = Format::new()
        .set_font_size(16)
        .set_bold()
        .set_font_color(Color::White)
        .set_background_color(primary_color)
        .set_align(FormatAlign::CenterAcross)
        .set_align(FormatAlign::VerticalCenter);
    let subtitle_format = Format::new()
        .set_font_size(10)
        .set_italic()
        .set_font_color(Color::White)
        .set_background_color(status_color)
        .set_align(FormatAlign::CenterAcross)
        .set_align(FormatAlign::VerticalCenter);
    let header_format = Format::new()
        .set_bold()
        .set_font_size(10)
        .set_font_color(Color::White)
        .set_background_color(header_bg)
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter)
        .set_text_wrap()
        .set_border(FormatBorder::Thin)
        .set_border_color(border_color);
    let row_format = |idx: usize| {
        Format::new()
            .set_font_size(10)
            .set_background_color(if idx % 2 == 0 { alt_row_1 } else { alt_row_2 })
            .set_align(FormatAlign::VerticalCenter)
            .set_border(FormatBorder::Thin)
            .set_border_color(border_color)
    };

    // ── Candidatos ──
    let columns = [
        ("№", 8.0),
        ("Nombre", 22.0),
        ("Apellido", 22.0),
        ("Correo", 30.0),
        ("Teléfono", 18.0),
        ("CV", 40.0),
        ("Resumen del CV", 60.0),
        ("Preguntas", 12.0),
        ("Fecha de registro", 20.0),
    ];
    let last_col = (columns.len() - 1) as u16;

    let sheet = workbook.add_worksheet();
    sheet.set_name("Candidatos")?;
    for (i, (_, width)) in columns.iter().enumerate() {
        sheet.set_column_width(i as u16, *width)?;
    }

    sheet.set_row_height(0, 40)?;
    sheet.merge_range(0, 0, 0, last_col, &vacancy.title, &title_format)?;
    sheet.set_row_height(1, 22)?;
    let subtitle = format!(
        "Estado: {}  •  Creada: {}  •  Candidatos: {}",
        vacancy.status,
        vacancy.created_at.format("%d/%m/%Y"),
        records.len()
    );
    sheet.merge_range(1, 0, 1, last_col, &subtitle, &subtitle_format)?;

    let header_row = 2;
    sheet.set_row_height(header_row, 30)?;
    for (i, (name, _)) in columns.iter().enumerate() {
        sheet.write_string_with_format(header_row, i as u16, *name, &header_format)?;
    }

    let data_start_row = 3;
    for (idx, record) in records.iter().enumerate() {
        let row = data_start_row + idx as u32;
        let c = &record.candidate;
        let base_fmt = row_format(idx);
        let center_fmt = base_fmt.clone().set_align(FormatAlign::Center);
        let wrap_fmt = base_fmt.clone().set_text_wrap();

        sheet.write_number_with_format(row, 0, (idx + 1) as f64, &center_fmt)?;
        sheet.write_string_with_format(row, 1, &c.first_name, &base_fmt.clone().set_bold())?;
        sheet.write_string_with_format(row, 2, &c.last_name, &base_fmt)?;
        sheet.write_string_with_format(row, 3, or_dash(&c.email), &base_fmt)?;
        sheet.write_string_with_format(row, 4, or_dash(&c.phone), &base_fmt)?;
        match c.cv_url.as_deref() {
            Some(url) => {
                sheet.write_url_with_text(row, 5, url, "Descargar CV")?;
            }
            None => {
                sheet.write_string_with_format(row, 5, "—", &center_fmt)?;
            }
        }
        sheet.write_string_with_format(row, 6, c.cached_summary().unwrap_or("—"), &wrap_fmt)?;
        sheet.write_number_with_format(row, 7, record.turns.len() as f64, &center_fmt)?;
        sheet.write_string_with_format(
            row,
            8,
            &c.created_at.format("%d/%m/%Y %H:%M").to_string(),
            &center_fmt,
        )?;
    }

    sheet.set_freeze_panes(3, 0)?;
    sheet.autofilter(
        header_row,
        0,
        (data_start_row + records.len() as u32).saturating_sub(1).max(header_row),
        last_col,
    )?;

    // ── Entrevistas ──
    let sheet = workbook.add_worksheet();
    sheet.set_name("Entrevistas")?;
    let interview_columns = [("Candidato", 30.0), ("№", 8.0), ("Pregunta", 60.0), ("Respuesta", 80.0)];
    for (i, (name, width)) in interview_columns.iter().enumerate() {
        sheet.set_column_width(i as u16, *width)?;
        sheet.write_string_with_format(0, i as u16, *name, &header_format)?;
    }
    sheet.set_row_height(0, 26)?;

    let mut row = 1u32;
    for (idx, record) in records.iter().enumerate() {
        let wrap_fmt = row_format(idx).set_text_wrap();
        let center_fmt = row_format(idx).set_align(FormatAlign::Center);
        let name = record.candidate.full_name();
        for turn in &record.turns {
            sheet.write_string_with_format(row, 0, &name, &wrap_fmt)?;
            sheet.write_number_with_format(row, 1, (turn.id + 1) as f64, &center_fmt)?;
            sheet.write_string_with_format(row, 2, &turn.question, &wrap_fmt)?;
            sheet.write_string_with_format(row, 3, or_dash(&turn.response), &wrap_fmt)?;
            row += 1;
        }
    }
    sheet.set_freeze_panes(1, 0)?;

    let buffer = workbook.save_to_buffer()?;
    Ok(buffer)
}
