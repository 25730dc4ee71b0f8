use crate::models::FlightInfo;

/// Pick the flight matching the ident and the origin/destination IATA codes.
///
/// With a departure epoch, the filed departure must equal it; otherwise the
/// first match wins.
pub fn find_flight<'a>(
    flights: &'a [FlightInfo],
    ident: &str,
    dep_apt: &str,
    arr_apt: &str,
    departure_epoch: Option<i64>,
) -> Option<&'a FlightInfo> {
    flights.iter().find(|flight| {
        flight.ident == ident
            && flight.origin.alternate_ident == dep_apt
            && flight.destination.alternate_ident == arr_apt
            && departure_epoch.map_or(true, |epoch| flight.departure_epoch() == Some(epoch))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FlightEndpoint, ProviderTime};

    fn flight(id: &str, ident: &str, dep: &str, arr: &str, departs: i64) -> FlightInfo {
        FlightInfo {
            fa_flight_id: id.to_string(),
            ident: ident.to_string(),
            origin: FlightEndpoint {
                alternate_ident: dep.to_string(),
                ..FlightEndpoint::default()
            },
            destination: FlightEndpoint {
                alternate_ident: arr.to_string(),
                ..FlightEndpoint::default()
            },
            filed_departure_time: Some(ProviderTime { epoch: departs, tz: None }),
            ..FlightInfo::default()
        }
    }

    fn schedule() -> Vec<FlightInfo> {
        vec![
            flight("DAL6404-1", "DAL6404", "JFK", "LAX", 1551650700),
            flight("DAL6404-2", "DAL6404", "JFK", "LAX", 1551737100),
            flight("DAL6404-3", "DAL6404", "LAX", "JFK", 1551680000),
        ]
    }

    #[test]
    fn first_match_without_departure() {
        let flights = schedule();
        let found = find_flight(&flights, "DAL6404", "JFK", "LAX", None).unwrap();
        assert_eq!(found.fa_flight_id, "DAL6404-1");
    }

    #[test]
    fn departure_epoch_selects_exact_flight() {
        let flights = schedule();
        let found = find_flight(&flights, "DAL6404", "JFK", "LAX", Some(1551737100)).unwrap();
        assert_eq!(found.fa_flight_id, "DAL6404-2");
    }

    #[test]
    fn direction_matters() {
        let flights = schedule();
        let found = find_flight(&flights, "DAL6404", "LAX", "JFK", None).unwrap();
        assert_eq!(found.fa_flight_id, "DAL6404-3");
    }

    #[test]
    fn no_match_is_none() {
        let flights = schedule();
        assert!(find_flight(&flights, "DAL6404", "JFK", "LAX", Some(1)).is_none());
        assert!(find_flight(&flights, "JBU669", "JFK", "LAX", None).is_none());
        assert!(find_flight(&[], "DAL6404", "JFK", "LAX", None).is_none());
    }
}
