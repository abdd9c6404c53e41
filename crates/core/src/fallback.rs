//! Static sample catalogue.
//!
//! Shown by the storefront when the backend is unreachable or the table is
//! empty, and inserted by `lv-cli seed`. Identifiers `1`, `2` and `3` match
//! the links the catalogue renders, so detail pages resolve against the same
//! table.

use rust_decimal::Decimal;

use crate::types::{Amount, Features, Specifications, Vehicle, VehicleId};

const CIVIC_IMAGE: &str = "/static/images/civic-2020.svg";
const COROLLA_IMAGE: &str = "/static/images/corolla-2021.svg";
const JETTA_IMAGE: &str = "/static/images/jetta-2019.svg";

/// The three sample vehicles, in catalogue order.
#[must_use]
pub fn catalogue() -> Vec<Vehicle> {
    vec![civic(), corolla(), jetta()]
}

/// Look up a sample vehicle by identifier.
#[must_use]
pub fn find(id: &VehicleId) -> Option<Vehicle> {
    catalogue().into_iter().find(|v| &v.id == id)
}

#[allow(clippy::too_many_arguments)]
fn sample(
    id: i64,
    name: &str,
    year: i32,
    price: i64,
    mileage: i64,
    transmission: &str,
    engine: &str,
    color: &str,
    image: &str,
) -> Vehicle {
    Vehicle {
        id: VehicleId::from(id),
        name: name.to_owned(),
        year,
        price: Some(Amount::Number(Decimal::from(price))),
        mileage: Some(Amount::Number(Decimal::from(mileage))),
        fuel: Some("Flex".to_owned()),
        transmission: Some(transmission.to_owned()),
        engine: Some(engine.to_owned()),
        color: Some(color.to_owned()),
        doors: Some("4 portas".to_owned()),
        description: None,
        features: Features::default(),
        specifications: Specifications::default(),
        images: vec![image.to_owned(); 4],
        image: None,
        created_at: None,
    }
}

fn civic() -> Vehicle {
    Vehicle {
        description: Some(
            "Honda Civic EXL 2020 em excelente estado de conservação. Veículo revisado, com \
             todos os manuais e chaves. Ideal para quem busca conforto, economia e tecnologia."
                .to_owned(),
        ),
        features: Features::new([
            "Ar condicionado digital",
            "Central multimídia com Android Auto/Apple CarPlay",
            "Câmera de ré",
            "Sensor de estacionamento",
            "Bancos em couro",
            "Rodas de liga leve 17\"",
            "Faróis em LED",
            "Controle de cruzeiro",
            "Piloto automático",
            "Sistema de som premium",
        ]),
        specifications: Specifications::new([
            ("Motor", "2.0 16V i-VTEC Flex"),
            ("Potência", "155 cv (etanol) / 150 cv (gasolina)"),
            ("Torque", "19,4 kgfm (etanol) / 19,0 kgfm (gasolina)"),
            ("Transmissão", "CVT Automático"),
            ("Tração", "Dianteira"),
            ("Combustível", "Flex (Etanol/Gasolina)"),
            ("Consumo cidade", "9,2 km/l (etanol) / 13,1 km/l (gasolina)"),
            ("Consumo estrada", "10,8 km/l (etanol) / 15,4 km/l (gasolina)"),
            ("Tanque", "50 litros"),
            ("Porta-malas", "519 litros"),
        ]),
        ..sample(
            1,
            "Honda Civic EXL",
            2020,
            89_900,
            45_000,
            "CVT Automático",
            "2.0 16V i-VTEC",
            "Branco Pérola",
            CIVIC_IMAGE,
        )
    }
}

fn corolla() -> Vehicle {
    Vehicle {
        description: Some(
            "Toyota Corolla XEI 2021 com baixa quilometragem. Veículo impecável, único dono, \
             sempre revisado na concessionária. Perfeito para quem valoriza qualidade e \
             durabilidade."
                .to_owned(),
        ),
        features: Features::new([
            "Ar condicionado automático",
            "Central multimídia Toyota Play",
            "Câmera de ré com linhas dinâmicas",
            "Sensores de estacionamento dianteiro e traseiro",
            "Bancos em tecido premium",
            "Rodas de liga leve 16\"",
            "Faróis automáticos",
            "Controle de cruzeiro adaptativo",
            "Sistema Toyota Safety Sense 2.0",
            "Carregador wireless",
        ]),
        specifications: Specifications::new([
            ("Motor", "2.0 16V Dual VVT-i Flex"),
            ("Potência", "177 cv (etanol) / 169 cv (gasolina)"),
            ("Torque", "21,4 kgfm (etanol) / 20,6 kgfm (gasolina)"),
            ("Transmissão", "CVT Automático"),
            ("Tração", "Dianteira"),
            ("Combustível", "Flex (Etanol/Gasolina)"),
            ("Consumo cidade", "9,8 km/l (etanol) / 14,0 km/l (gasolina)"),
            ("Consumo estrada", "11,5 km/l (etanol) / 16,4 km/l (gasolina)"),
            ("Tanque", "50 litros"),
            ("Porta-malas", "470 litros"),
        ]),
        ..sample(
            2,
            "Toyota Corolla XEI",
            2021,
            95_500,
            32_000,
            "CVT Automático",
            "2.0 16V Dual VVT-i",
            "Prata Metálico",
            COROLLA_IMAGE,
        )
    }
}

fn jetta() -> Vehicle {
    Vehicle {
        description: Some(
            "Volkswagen Jetta Comfortline 2019 com motor turbo. Sedan esportivo e elegante, \
             com excelente custo-benefício. Manutenção em dia e documentação ok."
                .to_owned(),
        ),
        features: Features::new([
            "Ar condicionado Climatronic",
            "Central multimídia Composition Media",
            "Câmera de ré",
            "Sensor de estacionamento traseiro",
            "Bancos em tecido",
            "Rodas de liga leve 16\"",
            "Faróis com regulagem elétrica",
            "Controle de cruzeiro",
            "Computador de bordo",
            "Volante multifuncional",
        ]),
        specifications: Specifications::new([
            ("Motor", "1.4 TSI Turbo Flex"),
            ("Potência", "150 cv (etanol) / 140 cv (gasolina)"),
            ("Torque", "25,5 kgfm (etanol) / 24,5 kgfm (gasolina)"),
            ("Transmissão", "Tiptronic 6 marchas"),
            ("Tração", "Dianteira"),
            ("Combustível", "Flex (Etanol/Gasolina)"),
            ("Consumo cidade", "8,9 km/l (etanol) / 12,7 km/l (gasolina)"),
            ("Consumo estrada", "11,2 km/l (etanol) / 16,0 km/l (gasolina)"),
            ("Tanque", "50 litros"),
            ("Porta-malas", "510 litros"),
        ]),
        ..sample(
            3,
            "Volkswagen Jetta Comfortline",
            2019,
            78_900,
            58_000,
            "Tiptronic Automático",
            "1.4 TSI Turbo",
            "Preto Ninja",
            JETTA_IMAGE,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalogue_order_and_ids() {
        let ids: Vec<String> = catalogue().iter().map(|v| v.id.to_string()).collect();
        assert_eq!(ids, ["1", "2", "3"]);
    }

    #[test]
    fn test_find_by_id() {
        let corolla = find(&VehicleId::from("2"));
        assert_eq!(corolla.map(|v| v.name), Some("Toyota Corolla XEI".to_string()));
        assert!(find(&VehicleId::from("4")).is_none());
    }

    #[test]
    fn test_samples_are_complete() {
        for vehicle in catalogue() {
            assert_eq!(vehicle.features.len(), 10);
            assert_eq!(vehicle.specifications.len(), 10);
            assert!(vehicle.cover_image().is_some());
            assert!(vehicle.description.is_some());
        }
    }
}
