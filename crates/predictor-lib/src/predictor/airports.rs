//! Built-in airport reference table
//!
//! Coordinates for major airports, used to derive the route distance
//! feature. Codes outside the table are still valid input; they just
//! produce an unknown route.

/// Earth mean radius in kilometres
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Airport reference entry
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Airport {
    pub iata: &'static str,
    pub icao: &'static str,
    pub latitude: f64,
    pub longitude: f64,
}

const fn airport(iata: &'static str, icao: &'static str, latitude: f64, longitude: f64) -> Airport {
    Airport {
        iata,
        icao,
        latitude,
        longitude,
    }
}

static AIRPORTS: &[Airport] = &[
    // North America
    airport("JFK", "KJFK", 40.6413, -73.7781),
    airport("LAX", "KLAX", 33.9416, -118.4085),
    airport("ORD", "KORD", 41.9742, -87.9073),
    airport("ATL", "KATL", 33.6407, -84.4277),
    airport("DFW", "KDFW", 32.8998, -97.0403),
    airport("DEN", "KDEN", 39.8561, -104.6737),
    airport("SFO", "KSFO", 37.6213, -122.3790),
    airport("SEA", "KSEA", 47.4502, -122.3088),
    airport("MIA", "KMIA", 25.7959, -80.2870),
    airport("BOS", "KBOS", 42.3656, -71.0096),
    airport("EWR", "KEWR", 40.6895, -74.1745),
    airport("LGA", "KLGA", 40.7769, -73.8740),
    airport("IAD", "KIAD", 38.9531, -77.4565),
    airport("PHX", "KPHX", 33.4352, -112.0101),
    airport("LAS", "KLAS", 36.0840, -115.1537),
    airport("MSP", "KMSP", 44.8848, -93.2223),
    airport("DTW", "KDTW", 42.2162, -83.3554),
    airport("CLT", "KCLT", 35.2144, -80.9473),
    airport("IAH", "KIAH", 29.9902, -95.3368),
    airport("YYZ", "CYYZ", 43.6777, -79.6248),
    airport("YVR", "CYVR", 49.1967, -123.1815),
    airport("MEX", "MMMX", 19.4361, -99.0719),
    // Europe
    airport("LHR", "EGLL", 51.4700, -0.4543),
    airport("LGW", "EGKK", 51.1537, -0.1821),
    airport("CDG", "LFPG", 49.0097, 2.5479),
    airport("ORY", "LFPO", 48.7262, 2.3652),
    airport("AMS", "EHAM", 52.3105, 4.7683),
    airport("FRA", "EDDF", 50.0379, 8.5622),
    airport("MUC", "EDDM", 48.3537, 11.7750),
    airport("MAD", "LEMD", 40.4983, -3.5676),
    airport("BCN", "LEBL", 41.2974, 2.0833),
    airport("FCO", "LIRF", 41.8003, 12.2389),
    airport("ZRH", "LSZH", 47.4582, 8.5555),
    airport("IST", "LTFM", 41.2753, 28.7519),
    // Middle East, Asia, Oceania
    airport("DXB", "OMDB", 25.2532, 55.3657),
    airport("DOH", "OTHH", 25.2731, 51.6081),
    airport("SIN", "WSSS", 1.3644, 103.9915),
    airport("HKG", "VHHH", 22.3080, 113.9185),
    airport("NRT", "RJAA", 35.7720, 140.3929),
    airport("HND", "RJTT", 35.5494, 139.7798),
    airport("ICN", "RKSI", 37.4602, 126.4407),
    airport("PEK", "ZBAA", 40.0799, 116.6031),
    airport("SYD", "YSSY", -33.9399, 151.1753),
    // South America, Africa
    airport("GRU", "SBGR", -23.4356, -46.4731),
    airport("JNB", "FAJS", -26.1367, 28.2411),
];

/// Look up an airport by normalized IATA or ICAO code
pub fn lookup(code: &str) -> Option<&'static Airport> {
    match code.len() {
        3 => AIRPORTS.iter().find(|a| a.iata == code),
        4 => AIRPORTS.iter().find(|a| a.icao == code),
        _ => None,
    }
}

/// Great-circle distance between two airports in kilometres
pub fn distance_km(from: &Airport, to: &Airport) -> f64 {
    let (lat1, lat2) = (from.latitude.to_radians(), to.latitude.to_radians());
    let d_lat = lat2 - lat1;
    let d_lon = (to.longitude - from.longitude).to_radians();

    let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_iata_and_icao() {
        let by_iata = lookup("CDG").unwrap();
        let by_icao = lookup("LFPG").unwrap();
        assert_eq!(by_iata, by_icao);
        assert!(lookup("XXX").is_none());
        assert!(lookup("JF").is_none());
    }

    #[test]
    fn test_distance_jfk_lax() {
        let jfk = lookup("JFK").unwrap();
        let lax = lookup("LAX").unwrap();
        let d = distance_km(jfk, lax);
        // ~3983 km great-circle
        assert!((3950.0..4020.0).contains(&d), "distance was {}", d);
        assert!((distance_km(lax, jfk) - d).abs() < 1e-6);
    }

    #[test]
    fn test_distance_to_self_is_zero() {
        let lhr = lookup("LHR").unwrap();
        assert!(distance_km(lhr, lhr).abs() < 1e-9);
    }

    #[test]
    fn test_codes_are_unique() {
        for (i, a) in AIRPORTS.iter().enumerate() {
            for b in &AIRPORTS[i + 1..] {
                assert_ne!(a.iata, b.iata);
                assert_ne!(a.icao, b.icao);
            }
        }
    }
}
