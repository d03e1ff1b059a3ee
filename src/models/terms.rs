// src/models/terms.rs

//! Darwin Core terms and the machine-tag lookup table.
//!
//! Flickr photographers label occurrence photos with machine tags such as
//! `taxonomy:binomial=Abies alba` or `dwc:country=Spain`. Several tag
//! spellings map onto the same output term; anything unrecognized is ignored.

use std::collections::HashMap;
use std::sync::OnceLock;

/// A Darwin Core term an extracted attribute can be filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Term {
    ScientificName,
    Kingdom,
    Phylum,
    Class,
    Order,
    Family,
    Genus,
    Country,
    StateProvince,
    Locality,
    DecimalLatitude,
    DecimalLongitude,
    CoordinatePrecision,
    EventDate,
    RecordedBy,
    IdentifiedBy,
    Sex,
    LifeStage,
    MinimumElevationInMeters,
    MaximumElevationInMeters,
    MinimumDepthInMeters,
    MaximumDepthInMeters,
    OccurrenceRemarks,
    CatalogNumber,
}

impl Term {
    /// Column name used in the archive core file.
    pub fn column(&self) -> &'static str {
        match self {
            Term::ScientificName => "scientificName",
            Term::Kingdom => "kingdom",
            Term::Phylum => "phylum",
            Term::Class => "class",
            Term::Order => "order",
            Term::Family => "family",
            Term::Genus => "genus",
            Term::Country => "country",
            Term::StateProvince => "stateProvince",
            Term::Locality => "locality",
            Term::DecimalLatitude => "decimalLatitude",
            Term::DecimalLongitude => "decimalLongitude",
            Term::CoordinatePrecision => "coordinatePrecision",
            Term::EventDate => "eventDate",
            Term::RecordedBy => "recordedBy",
            Term::IdentifiedBy => "identifiedBy",
            Term::Sex => "sex",
            Term::LifeStage => "lifeStage",
            Term::MinimumElevationInMeters => "minimumElevationInMeters",
            Term::MaximumElevationInMeters => "maximumElevationInMeters",
            Term::MinimumDepthInMeters => "minimumDepthInMeters",
            Term::MaximumDepthInMeters => "maximumDepthInMeters",
            Term::OccurrenceRemarks => "occurrenceRemarks",
            Term::CatalogNumber => "catalogNumber",
        }
    }

    /// Terms whose tag values must parse as a number to be accepted.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            Term::DecimalLatitude
                | Term::DecimalLongitude
                | Term::CoordinatePrecision
                | Term::MinimumElevationInMeters
                | Term::MaximumElevationInMeters
                | Term::MinimumDepthInMeters
                | Term::MaximumDepthInMeters
        )
    }
}

/// Machine-tag key (`namespace:key`, lowercase) to term table.
static TAG_TABLE: OnceLock<HashMap<&'static str, Term>> = OnceLock::new();

fn tag_table() -> &'static HashMap<&'static str, Term> {
    TAG_TABLE.get_or_init(|| {
        let mut m = HashMap::new();
        // Scientific name carries the most spellings in the wild.
        m.insert("dwc:scientificname", Term::ScientificName);
        m.insert("darwincore:scientificname", Term::ScientificName);
        m.insert("taxonomy:binomial", Term::ScientificName);
        m.insert("taxonomy:latinname", Term::ScientificName);
        m.insert("taxonomy:trinomial", Term::ScientificName);

        m.insert("dwc:kingdom", Term::Kingdom);
        m.insert("taxonomy:kingdom", Term::Kingdom);
        m.insert("dwc:phylum", Term::Phylum);
        m.insert("taxonomy:phylum", Term::Phylum);
        m.insert("dwc:class", Term::Class);
        m.insert("taxonomy:class", Term::Class);
        m.insert("dwc:order", Term::Order);
        m.insert("taxonomy:order", Term::Order);
        m.insert("dwc:family", Term::Family);
        m.insert("taxonomy:family", Term::Family);
        m.insert("dwc:genus", Term::Genus);
        m.insert("taxonomy:genus", Term::Genus);

        m.insert("dwc:country", Term::Country);
        m.insert("darwincore:country", Term::Country);
        m.insert("dwc:stateprovince", Term::StateProvince);
        m.insert("dwc:locality", Term::Locality);
        m.insert("geo:locality", Term::Locality);

        m.insert("dwc:decimallatitude", Term::DecimalLatitude);
        m.insert("dwc:decimallongitude", Term::DecimalLongitude);
        m.insert("dwc:coordinateprecision", Term::CoordinatePrecision);

        m.insert("dwc:eventdate", Term::EventDate);
        m.insert("dwc:earliestdatecollected", Term::EventDate);
        m.insert("dwc:recordedby", Term::RecordedBy);
        m.insert("dwc:identifiedby", Term::IdentifiedBy);
        m.insert("dwc:sex", Term::Sex);
        m.insert("dwc:lifestage", Term::LifeStage);

        m.insert("dwc:minimumelevationinmeters", Term::MinimumElevationInMeters);
        m.insert("dwc:maximumelevationinmeters", Term::MaximumElevationInMeters);
        m.insert("dwc:minimumdepthinmeters", Term::MinimumDepthInMeters);
        m.insert("dwc:maximumdepthinmeters", Term::MaximumDepthInMeters);

        m.insert("dwc:occurrenceremarks", Term::OccurrenceRemarks);
        m.insert("dwc:catalognumber", Term::CatalogNumber);
        m
    })
}

/// Resolve a machine-tag key to its term, if one is recognized.
///
/// Keys are matched case-insensitively; unknown keys yield `None`.
pub fn term_for_tag(key: &str) -> Option<Term> {
    tag_table().get(key.to_ascii_lowercase().as_str()).copied()
}
