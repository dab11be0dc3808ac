//! Common test fixtures for the crest and gridded pipelines.
//!
//! This module provides small CSV tables shaped like the real inputs.

/// Crest table fixtures (`;`-separated, spreadsheet export headers).
pub mod crest {
    /// Header row of the crest table.
    pub const HEADER: &str = "Département;Nom_Sommet;Altitude_Sommet;Nom_prefecture;Altitude_Préfécture;Nom_station de ski;Altitude_basse_station de ski;Altitude_haute_station de ski";

    /// Five points along the Alps, two of them with a ski station.
    pub const FIVE_POINTS_TWO_STATIONS: &str = "\
Département;Nom_Sommet;Altitude_Sommet;Nom_prefecture;Altitude_Préfécture;Nom_station de ski;Altitude_basse_station de ski;Altitude_haute_station de ski
Haute-Savoie;Mont Blanc;4808;Annecy;448;Chamonix;1035;3842
Savoie;Grande Casse;3855;Chambéry;270;;;
Isère;Barre des Écrins;4102;Grenoble;212;;;
Hautes-Alpes;Pic de Rochebrune;3320;Gap;735;Serre Chevalier;1200;2800
Alpes-de-Haute-Provence;Aiguille de Chambeyron;3412;Digne-les-Bains;608;;;
";

    /// Same ridge with a row lacking a peak and one with a malformed altitude.
    pub const WITH_GAPS: &str = "\
Département;Nom_Sommet;Altitude_Sommet;Nom_prefecture;Altitude_Préfécture;Nom_station de ski;Altitude_basse_station de ski;Altitude_haute_station de ski
Haute-Savoie;Mont Blanc;4808;Annecy;448;Chamonix;1035;3842
Savoie;;;Chambéry;270;Val Thorens;1800;3230
Isère;Barre des Écrins;4102;Grenoble;212;;;
Drôme;Grand Veymont;2341;Valence;1 26;;;
";

    /// Two stations, the second named but missing its low altitude.
    pub const STATION_MISSING_BOUND: &str = "\
Département;Nom_Sommet;Altitude_Sommet;Nom_prefecture;Altitude_Préfécture;Nom_station de ski;Altitude_basse_station de ski;Altitude_haute_station de ski
Haute-Savoie;Mont Blanc;4808;Annecy;448;Chamonix;1035;3842
Savoie;Grande Casse;3855;Chambéry;270;Tignes;;3456
Isère;Barre des Écrins;4102;Grenoble;212;;;
";
}

/// Period statistics fixtures (`,`-separated, period label as first column).
pub mod stats {
    /// 0 °C isotherm statistics for five periods.
    pub const ISOTHERM_0: &str = "\
,min_elevation,mean_elevation,max_elevation
1990-2020,1210.0,1893.2,2480.0
2021-2040,1347.0,2039.4,2617.0
2041-2060,1675.0,2231.5,2750.0
2061-2080,1742.0,2339.5,2793.0
2081-2100,2126.0,2565.5,2999.0
";

    /// Tropical 20 °C threshold statistics for the same periods.
    pub const TROPICAL_20: &str = "\
,min_elevation,mean_elevation,max_elevation
1990-2020,0.0,150.0,420.0
2021-2040,0.0,210.0,610.0
2041-2060,0.0,280.0,780.0
2061-2080,50.0,390.0,960.0
2081-2100,120.0,520.0,1240.0
";
}

/// Year ranges used by gridded tests.
pub mod years {
    /// Every projection year, 1990..=2099.
    pub fn full_range() -> Vec<i32> {
        (1990..2100).collect()
    }
}
