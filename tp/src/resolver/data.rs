//! Embedded location tables for the destination resolver
//!
//! A deliberately small, curated table of major airports, metro city codes,
//! and multi-city regions. Anything not covered here falls through to the
//! geocoding and LLM layers.

/// A known airport
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Airport {
    /// IATA airport code
    pub code: &'static str,
    /// IATA metro/city code
    pub city_code: &'static str,
    /// City served
    pub city: &'static str,
    pub country: &'static str,
    /// Display name
    pub name: &'static str,
    pub lat: f64,
    pub lon: f64,
    /// Lowercase alternative spellings for the city
    pub aliases: &'static [&'static str],
}

/// A multi-city region ("French Riviera" and friends)
#[derive(Debug, Clone, Copy)]
pub struct Region {
    pub name: &'static str,
    /// Lowercase match phrases, including the name itself
    pub aliases: &'static [&'static str],
    /// Member cities with the airport that serves them
    pub cities: &'static [RegionCity],
}

#[derive(Debug, Clone, Copy)]
pub struct RegionCity {
    pub name: &'static str,
    pub country: &'static str,
    /// Serving airport code, present in AIRPORTS
    pub airport: &'static str,
}

pub const AIRPORTS: &[Airport] = &[
    Airport { code: "JFK", city_code: "NYC", city: "New York", country: "United States", name: "John F. Kennedy International", lat: 40.6413, lon: -73.7781, aliases: &["nyc", "new york city", "big apple"] },
    Airport { code: "EWR", city_code: "NYC", city: "New York", country: "United States", name: "Newark Liberty International", lat: 40.6895, lon: -74.1745, aliases: &["newark"] },
    Airport { code: "LAX", city_code: "LAX", city: "Los Angeles", country: "United States", name: "Los Angeles International", lat: 33.9416, lon: -118.4085, aliases: &["la"] },
    Airport { code: "SFO", city_code: "SFO", city: "San Francisco", country: "United States", name: "San Francisco International", lat: 37.6213, lon: -122.3790, aliases: &["san fran", "sf"] },
    Airport { code: "ORD", city_code: "CHI", city: "Chicago", country: "United States", name: "O'Hare International", lat: 41.9742, lon: -87.9073, aliases: &[] },
    Airport { code: "MIA", city_code: "MIA", city: "Miami", country: "United States", name: "Miami International", lat: 25.7959, lon: -80.2870, aliases: &[] },
    Airport { code: "BOS", city_code: "BOS", city: "Boston", country: "United States", name: "Boston Logan International", lat: 42.3656, lon: -71.0096, aliases: &[] },
    Airport { code: "SEA", city_code: "SEA", city: "Seattle", country: "United States", name: "Seattle-Tacoma International", lat: 47.4502, lon: -122.3088, aliases: &[] },
    Airport { code: "ATL", city_code: "ATL", city: "Atlanta", country: "United States", name: "Hartsfield-Jackson Atlanta International", lat: 33.6407, lon: -84.4277, aliases: &[] },
    Airport { code: "DEN", city_code: "DEN", city: "Denver", country: "United States", name: "Denver International", lat: 39.8561, lon: -104.6737, aliases: &[] },
    Airport { code: "HNL", city_code: "HNL", city: "Honolulu", country: "United States", name: "Daniel K. Inouye International", lat: 21.3187, lon: -157.9225, aliases: &["hawaii", "oahu"] },
    Airport { code: "YYZ", city_code: "YTO", city: "Toronto", country: "Canada", name: "Toronto Pearson International", lat: 43.6777, lon: -79.6248, aliases: &[] },
    Airport { code: "YVR", city_code: "YVR", city: "Vancouver", country: "Canada", name: "Vancouver International", lat: 49.1967, lon: -123.1815, aliases: &[] },
    Airport { code: "MEX", city_code: "MEX", city: "Mexico City", country: "Mexico", name: "Benito Juarez International", lat: 19.4363, lon: -99.0721, aliases: &[] },
    Airport { code: "CUN", city_code: "CUN", city: "Cancun", country: "Mexico", name: "Cancun International", lat: 21.0365, lon: -86.8771, aliases: &["cancún"] },
    Airport { code: "GRU", city_code: "SAO", city: "Sao Paulo", country: "Brazil", name: "Guarulhos International", lat: -23.4356, lon: -46.4731, aliases: &["são paulo"] },
    Airport { code: "EZE", city_code: "BUE", city: "Buenos Aires", country: "Argentina", name: "Ministro Pistarini International", lat: -34.8222, lon: -58.5358, aliases: &[] },
    Airport { code: "LHR", city_code: "LON", city: "London", country: "United Kingdom", name: "London Heathrow", lat: 51.4700, lon: -0.4543, aliases: &[] },
    Airport { code: "LGW", city_code: "LON", city: "London", country: "United Kingdom", name: "London Gatwick", lat: 51.1537, lon: -0.1821, aliases: &[] },
    Airport { code: "CDG", city_code: "PAR", city: "Paris", country: "France", name: "Paris Charles de Gaulle", lat: 49.0097, lon: 2.5479, aliases: &["city of light"] },
    Airport { code: "ORY", city_code: "PAR", city: "Paris", country: "France", name: "Paris Orly", lat: 48.7262, lon: 2.3652, aliases: &[] },
    Airport { code: "NCE", city_code: "NCE", city: "Nice", country: "France", name: "Nice Cote d'Azur", lat: 43.6584, lon: 7.2159, aliases: &["cote d'azur"] },
    Airport { code: "MRS", city_code: "MRS", city: "Marseille", country: "France", name: "Marseille Provence", lat: 43.4393, lon: 5.2214, aliases: &[] },
    Airport { code: "AMS", city_code: "AMS", city: "Amsterdam", country: "Netherlands", name: "Amsterdam Schiphol", lat: 52.3105, lon: 4.7683, aliases: &[] },
    Airport { code: "FRA", city_code: "FRA", city: "Frankfurt", country: "Germany", name: "Frankfurt am Main", lat: 50.0379, lon: 8.5622, aliases: &[] },
    Airport { code: "MUC", city_code: "MUC", city: "Munich", country: "Germany", name: "Munich International", lat: 48.3537, lon: 11.7750, aliases: &["münchen", "munchen"] },
    Airport { code: "BER", city_code: "BER", city: "Berlin", country: "Germany", name: "Berlin Brandenburg", lat: 52.3667, lon: 13.5033, aliases: &[] },
    Airport { code: "MAD", city_code: "MAD", city: "Madrid", country: "Spain", name: "Adolfo Suarez Madrid-Barajas", lat: 40.4983, lon: -3.5676, aliases: &[] },
    Airport { code: "BCN", city_code: "BCN", city: "Barcelona", country: "Spain", name: "Barcelona-El Prat", lat: 41.2974, lon: 2.0833, aliases: &[] },
    Airport { code: "AGP", city_code: "AGP", city: "Malaga", country: "Spain", name: "Malaga-Costa del Sol", lat: 36.6749, lon: -4.4991, aliases: &["málaga"] },
    Airport { code: "LIS", city_code: "LIS", city: "Lisbon", country: "Portugal", name: "Humberto Delgado", lat: 38.7742, lon: -9.1342, aliases: &["lisboa"] },
    Airport { code: "FCO", city_code: "ROM", city: "Rome", country: "Italy", name: "Rome Fiumicino", lat: 41.8003, lon: 12.2389, aliases: &["roma", "eternal city"] },
    Airport { code: "MXP", city_code: "MIL", city: "Milan", country: "Italy", name: "Milan Malpensa", lat: 45.6306, lon: 8.7281, aliases: &["milano"] },
    Airport { code: "VCE", city_code: "VCE", city: "Venice", country: "Italy", name: "Venice Marco Polo", lat: 45.5053, lon: 12.3519, aliases: &["venezia"] },
    Airport { code: "NAP", city_code: "NAP", city: "Naples", country: "Italy", name: "Naples International", lat: 40.8860, lon: 14.2908, aliases: &["napoli"] },
    Airport { code: "ATH", city_code: "ATH", city: "Athens", country: "Greece", name: "Athens International", lat: 37.9364, lon: 23.9445, aliases: &[] },
    Airport { code: "JTR", city_code: "JTR", city: "Santorini", country: "Greece", name: "Santorini International", lat: 36.3992, lon: 25.4793, aliases: &["thira"] },
    Airport { code: "JMK", city_code: "JMK", city: "Mykonos", country: "Greece", name: "Mykonos International", lat: 37.4351, lon: 25.3481, aliases: &[] },
    Airport { code: "ZRH", city_code: "ZRH", city: "Zurich", country: "Switzerland", name: "Zurich Airport", lat: 47.4582, lon: 8.5555, aliases: &["zürich"] },
    Airport { code: "GVA", city_code: "GVA", city: "Geneva", country: "Switzerland", name: "Geneva Airport", lat: 46.2381, lon: 6.1090, aliases: &["genève"] },
    Airport { code: "VIE", city_code: "VIE", city: "Vienna", country: "Austria", name: "Vienna International", lat: 48.1103, lon: 16.5697, aliases: &["wien"] },
    Airport { code: "PRG", city_code: "PRG", city: "Prague", country: "Czech Republic", name: "Vaclav Havel Prague", lat: 50.1008, lon: 14.2632, aliases: &["praha"] },
    Airport { code: "CPH", city_code: "CPH", city: "Copenhagen", country: "Denmark", name: "Copenhagen Kastrup", lat: 55.6181, lon: 12.6561, aliases: &[] },
    Airport { code: "ARN", city_code: "STO", city: "Stockholm", country: "Sweden", name: "Stockholm Arlanda", lat: 59.6498, lon: 17.9238, aliases: &[] },
    Airport { code: "DUB", city_code: "DUB", city: "Dublin", country: "Ireland", name: "Dublin Airport", lat: 53.4264, lon: -6.2499, aliases: &[] },
    Airport { code: "IST", city_code: "IST", city: "Istanbul", country: "Turkey", name: "Istanbul Airport", lat: 41.2753, lon: 28.7519, aliases: &[] },
    Airport { code: "DXB", city_code: "DXB", city: "Dubai", country: "United Arab Emirates", name: "Dubai International", lat: 25.2532, lon: 55.3657, aliases: &[] },
    Airport { code: "DOH", city_code: "DOH", city: "Doha", country: "Qatar", name: "Hamad International", lat: 25.2731, lon: 51.6081, aliases: &[] },
    Airport { code: "CAI", city_code: "CAI", city: "Cairo", country: "Egypt", name: "Cairo International", lat: 30.1219, lon: 31.4056, aliases: &[] },
    Airport { code: "CPT", city_code: "CPT", city: "Cape Town", country: "South Africa", name: "Cape Town International", lat: -33.9715, lon: 18.6021, aliases: &[] },
    Airport { code: "BOM", city_code: "BOM", city: "Mumbai", country: "India", name: "Chhatrapati Shivaji Maharaj International", lat: 19.0896, lon: 72.8656, aliases: &["bombay"] },
    Airport { code: "DEL", city_code: "DEL", city: "New Delhi", country: "India", name: "Indira Gandhi International", lat: 28.5562, lon: 77.1000, aliases: &["delhi"] },
    Airport { code: "SIN", city_code: "SIN", city: "Singapore", country: "Singapore", name: "Singapore Changi", lat: 1.3644, lon: 103.9915, aliases: &[] },
    Airport { code: "BKK", city_code: "BKK", city: "Bangkok", country: "Thailand", name: "Suvarnabhumi", lat: 13.6900, lon: 100.7501, aliases: &[] },
    Airport { code: "HKT", city_code: "HKT", city: "Phuket", country: "Thailand", name: "Phuket International", lat: 8.1132, lon: 98.3169, aliases: &[] },
    Airport { code: "DPS", city_code: "DPS", city: "Denpasar", country: "Indonesia", name: "Ngurah Rai International", lat: -8.7482, lon: 115.1672, aliases: &["bali"] },
    Airport { code: "HKG", city_code: "HKG", city: "Hong Kong", country: "China", name: "Hong Kong International", lat: 22.3080, lon: 113.9185, aliases: &[] },
    Airport { code: "PVG", city_code: "SHA", city: "Shanghai", country: "China", name: "Shanghai Pudong International", lat: 31.1443, lon: 121.8083, aliases: &[] },
    Airport { code: "PEK", city_code: "BJS", city: "Beijing", country: "China", name: "Beijing Capital International", lat: 40.0799, lon: 116.6031, aliases: &[] },
    Airport { code: "NRT", city_code: "TYO", city: "Tokyo", country: "Japan", name: "Tokyo Narita International", lat: 35.7719, lon: 140.3929, aliases: &[] },
    Airport { code: "HND", city_code: "TYO", city: "Tokyo", country: "Japan", name: "Tokyo Haneda", lat: 35.5494, lon: 139.7798, aliases: &[] },
    Airport { code: "ICN", city_code: "SEL", city: "Seoul", country: "South Korea", name: "Incheon International", lat: 37.4602, lon: 126.4407, aliases: &[] },
    Airport { code: "SYD", city_code: "SYD", city: "Sydney", country: "Australia", name: "Sydney Kingsford Smith", lat: -33.9399, lon: 151.1753, aliases: &[] },
    Airport { code: "MEL", city_code: "MEL", city: "Melbourne", country: "Australia", name: "Melbourne Tullamarine", lat: -37.6690, lon: 144.8410, aliases: &[] },
    Airport { code: "AKL", city_code: "AKL", city: "Auckland", country: "New Zealand", name: "Auckland Airport", lat: -37.0082, lon: 174.7850, aliases: &[] },
];

/// IATA metro city codes that are not airport codes themselves
pub const CITY_CODES: &[(&str, &str)] = &[
    ("NYC", "New York"),
    ("LON", "London"),
    ("PAR", "Paris"),
    ("TYO", "Tokyo"),
    ("ROM", "Rome"),
    ("MIL", "Milan"),
    ("CHI", "Chicago"),
    ("SAO", "Sao Paulo"),
    ("BUE", "Buenos Aires"),
    ("STO", "Stockholm"),
    ("SEL", "Seoul"),
    ("BJS", "Beijing"),
    ("SHA", "Shanghai"),
    ("YTO", "Toronto"),
];

pub const REGIONS: &[Region] = &[
    Region {
        name: "French Riviera",
        aliases: &["french riviera", "cote d'azur", "côte d'azur", "the riviera"],
        cities: &[
            RegionCity { name: "Nice", country: "France", airport: "NCE" },
            RegionCity { name: "Cannes", country: "France", airport: "NCE" },
            RegionCity { name: "Monaco", country: "Monaco", airport: "NCE" },
            RegionCity { name: "Saint-Tropez", country: "France", airport: "NCE" },
            RegionCity { name: "Antibes", country: "France", airport: "NCE" },
        ],
    },
    Region {
        name: "Amalfi Coast",
        aliases: &["amalfi coast", "amalfi"],
        cities: &[
            RegionCity { name: "Naples", country: "Italy", airport: "NAP" },
            RegionCity { name: "Positano", country: "Italy", airport: "NAP" },
            RegionCity { name: "Amalfi", country: "Italy", airport: "NAP" },
            RegionCity { name: "Sorrento", country: "Italy", airport: "NAP" },
        ],
    },
    Region {
        name: "Greek Islands",
        aliases: &["greek islands", "greek isles", "cyclades"],
        cities: &[
            RegionCity { name: "Santorini", country: "Greece", airport: "JTR" },
            RegionCity { name: "Mykonos", country: "Greece", airport: "JMK" },
            RegionCity { name: "Athens", country: "Greece", airport: "ATH" },
        ],
    },
    Region {
        name: "Swiss Alps",
        aliases: &["swiss alps", "the alps", "alps"],
        cities: &[
            RegionCity { name: "Zurich", country: "Switzerland", airport: "ZRH" },
            RegionCity { name: "Geneva", country: "Switzerland", airport: "GVA" },
            RegionCity { name: "Zermatt", country: "Switzerland", airport: "GVA" },
            RegionCity { name: "Interlaken", country: "Switzerland", airport: "ZRH" },
        ],
    },
    Region {
        name: "Costa del Sol",
        aliases: &["costa del sol"],
        cities: &[
            RegionCity { name: "Malaga", country: "Spain", airport: "AGP" },
            RegionCity { name: "Marbella", country: "Spain", airport: "AGP" },
        ],
    },
    Region {
        name: "Bali",
        aliases: &["bali"],
        cities: &[
            RegionCity { name: "Denpasar", country: "Indonesia", airport: "DPS" },
            RegionCity { name: "Ubud", country: "Indonesia", airport: "DPS" },
            RegionCity { name: "Seminyak", country: "Indonesia", airport: "DPS" },
        ],
    },
    Region {
        name: "Tuscany",
        aliases: &["tuscany", "toscana"],
        cities: &[
            RegionCity { name: "Florence", country: "Italy", airport: "FCO" },
            RegionCity { name: "Siena", country: "Italy", airport: "FCO" },
            RegionCity { name: "Pisa", country: "Italy", airport: "FCO" },
        ],
    },
];

/// Look up an airport by IATA code (case-insensitive)
pub fn airport_by_code(code: &str) -> Option<&'static Airport> {
    AIRPORTS.iter().find(|a| a.code.eq_ignore_ascii_case(code))
}

/// Look up a metro city name by city code (case-insensitive)
pub fn city_for_code(code: &str) -> Option<&'static str> {
    CITY_CODES
        .iter()
        .find(|(c, _)| c.eq_ignore_ascii_case(code))
        .map(|(_, city)| *city)
}

/// All airports serving a city, table order preserved
pub fn airports_for_city(city: &str) -> impl Iterator<Item = &'static Airport> {
    AIRPORTS.iter().filter(move |a| a.city.eq_ignore_ascii_case(city))
}

/// Primary airport for a city name, if the city is known
pub fn primary_airport_for_city(city: &str) -> Option<&'static Airport> {
    airports_for_city(city).next()
}

/// Nearest known airport to a coordinate
pub fn nearest_airport(lat: f64, lon: f64) -> Option<&'static Airport> {
    AIRPORTS
        .iter()
        .min_by(|a, b| {
            let da = haversine_km(lat, lon, a.lat, a.lon);
            let db = haversine_km(lat, lon, b.lat, b.lon);
            da.total_cmp(&db)
        })
}

/// Great-circle distance in kilometers
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    const EARTH_RADIUS_KM: f64 = 6371.0;
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2) + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * a.sqrt().atan2((1.0 - a).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_airport_by_code() {
        let jfk = airport_by_code("JFK").unwrap();
        assert_eq!(jfk.city, "New York");
        assert_eq!(jfk.city_code, "NYC");

        // Case-insensitive
        assert!(airport_by_code("cdg").is_some());
        assert!(airport_by_code("XXX").is_none());
    }

    #[test]
    fn test_city_codes() {
        assert_eq!(city_for_code("PAR"), Some("Paris"));
        assert_eq!(city_for_code("par"), Some("Paris"));
        assert_eq!(city_for_code("ZZZ"), None);
    }

    #[test]
    fn test_airports_for_city_order() {
        let paris: Vec<_> = airports_for_city("Paris").collect();
        assert_eq!(paris.len(), 2);
        assert_eq!(paris[0].code, "CDG");
        assert_eq!(primary_airport_for_city("paris").unwrap().code, "CDG");
    }

    #[test]
    fn test_region_cities_have_known_airports() {
        for region in REGIONS {
            for city in region.cities {
                assert!(
                    airport_by_code(city.airport).is_some(),
                    "region {} city {} references unknown airport {}",
                    region.name,
                    city.name,
                    city.airport
                );
            }
        }
    }

    #[test]
    fn test_nearest_airport() {
        // Versailles is closest to Orly
        let nearest = nearest_airport(48.8049, 2.1204).unwrap();
        assert_eq!(nearest.code, "ORY");
    }

    #[test]
    fn test_haversine_sanity() {
        // JFK to LHR is roughly 5540 km
        let d = haversine_km(40.6413, -73.7781, 51.4700, -0.4543);
        assert!((d - 5540.0).abs() < 50.0, "got {}", d);
    }
}
