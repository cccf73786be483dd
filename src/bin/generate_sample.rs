use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate};
use rust_xlsxwriter::Workbook;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn below(&mut self, n: usize) -> usize {
        (self.next_u64() % n as u64) as usize
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[self.below(items.len())]
    }

    fn chance(&mut self, percent: usize) -> bool {
        self.below(100) < percent
    }
}

const HEADERS: &[&str] = &[
    "DateTime",
    "Nome",
    "Sobrenome",
    "Placa Veículo",
    "Número de Frota",
    "Qual a sua posição atual?",
    "Qual a cidade em que esta aguardando o carregamento?",
    "Em qual cliente você está?",
    "Há quantas horas você esta aguardando para carregar?",
    "Qual a cidade de destino?",
    "Qual a cidade que você esta agora?",
    "Aguardando descarga em qual cidade?",
    "Aguardando descarga em qual cliente?",
    "Há quantas horas esta aguardando a descarga?",
    "Está vazio em qual cidade?",
    "Já tem carga?",
    "TIRAR FOTO DO KM ATUAL DO VEÍCULO",
];

// Column positions in HEADERS.
const COL_LOADING_CITY: u16 = 6;
const COL_LOADING_CLIENT: u16 = 7;
const COL_LOADING_HOURS: u16 = 8;
const COL_DESTINATION: u16 = 9;
const COL_CURRENT_CITY: u16 = 10;
const COL_UNLOADING_CITY: u16 = 11;
const COL_UNLOADING_CLIENT: u16 = 12;
const COL_UNLOADING_HOURS: u16 = 13;
const COL_EMPTY_CITY: u16 = 14;
const COL_HAS_CARGO: u16 = 15;
const COL_PHOTO: u16 = 16;

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);

    let drivers = [
        ("João", "Silva"),
        ("Ana", "Souza"),
        ("Carlos", "Pereira"),
        ("Marcos", ""),
        ("Luiz", "Oliveira"),
        ("Rafael", "Costa"),
    ];
    let plates = ["ABC1D23", "BRA2E19", "QWE4R56", "RTY7U89", "MNB3V21", "ZXC9K87"];
    let cities = ["Curitiba", "Maringá", "Cascavel", "Londrina", "Ponta Grossa", "Paranaguá"];
    let clients = ["Coamo", "Cocamar", "C.Vale", "Lar", "Agrária"];
    let statuses = ["Aguardando carregamento", "Aguardando descarga", "Vazio", "Em viagem"];

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    for (col, header) in HEADERS.iter().enumerate() {
        sheet.write_string(0, col as u16, *header)?;
    }

    let start = NaiveDate::from_ymd_opt(2024, 5, 1)
        .and_then(|d| d.and_hms_opt(6, 0, 0))
        .context("invalid start date")?;

    let rows = 60u32;
    for row in 1..=rows {
        let driver = rng.below(drivers.len());
        let (first, last) = drivers[driver];
        let when = start + Duration::minutes((row as i64) * 137 + rng.below(60) as i64);

        // Some rows carry a broken timestamp, like hand-edited exports do.
        if rng.chance(5) {
            sheet.write_string(row, 0, "sem data")?;
        } else {
            sheet.write_string(row, 0, when.format("%Y-%m-%d %H:%M:%S").to_string())?;
        }
        sheet.write_string(row, 1, first)?;
        if !last.is_empty() {
            sheet.write_string(row, 2, last)?;
        }
        sheet.write_string(row, 3, plates[driver])?;
        sheet.write_number(row, 4, (100 + driver) as f64)?;

        // A few drivers skip the position question.
        let status = if rng.chance(8) { None } else { Some(rng.pick(&statuses)) };
        if let Some(status) = status {
            sheet.write_string(row, 5, status)?;
        }
        match status {
            Some("Aguardando carregamento") => {
                sheet.write_string(row, COL_LOADING_CITY, rng.pick(&cities))?;
                sheet.write_string(row, COL_LOADING_CLIENT, rng.pick(&clients))?;
                sheet.write_number(row, COL_LOADING_HOURS, rng.below(24) as f64)?;
            }
            Some("Aguardando descarga") => {
                sheet.write_string(row, COL_UNLOADING_CITY, rng.pick(&cities))?;
                sheet.write_string(row, COL_UNLOADING_CLIENT, rng.pick(&clients))?;
                sheet.write_number(row, COL_UNLOADING_HOURS, rng.below(24) as f64)?;
            }
            Some("Vazio") => {
                sheet.write_string(row, COL_EMPTY_CITY, rng.pick(&cities))?;
                sheet.write_string(row, COL_HAS_CARGO, if rng.chance(40) { "Sim" } else { "Não" })?;
            }
            Some(_) => {
                sheet.write_string(row, COL_CURRENT_CITY, rng.pick(&cities))?;
                sheet.write_string(row, COL_DESTINATION, rng.pick(&cities))?;
            }
            None => {}
        }

        if rng.chance(80) {
            let url = format!("https://picsum.photos/seed/km{row}/640/480");
            sheet.write_string(row, COL_PHOTO, url)?;
        }
    }

    let output_path = "sample_checkins.xlsx";
    workbook
        .save(output_path)
        .with_context(|| format!("writing {output_path}"))?;

    println!("Wrote {rows} check-ins to {output_path}");
    Ok(())
}
