use crate::error::TrackError;
use crate::models::GeoPoint;

/// Binært ruteformat, fast byte-rekkefølge (big-endian):
/// 4 byte punktantall N, deretter N × (8 byte breddegrad, 8 byte lengdegrad)
/// som IEEE 754. `encode(&[])` gir en gyldig null-telling-payload på 4 byte —
/// det er noe annet enn "ingen rute" (fravær av payload).
pub fn encode_route(points: &[GeoPoint]) -> Vec<u8> {
    let mut out = Vec::with_capacity(4 + points.len() * 16);
    out.extend_from_slice(&(points.len() as u32).to_be_bytes());
    for p in points {
        out.extend_from_slice(&p.lat.to_be_bytes());
        out.extend_from_slice(&p.lon.to_be_bytes());
    }
    out
}

/// Dekoder en rute-payload. Tom input gir tom rute uten feil;
/// avkuttet eller inkonsistent payload er en feil.
pub fn decode_route(bytes: &[u8]) -> Result<Vec<GeoPoint>, TrackError> {
    if bytes.is_empty() {
        return Ok(Vec::new());
    }
    if bytes.len() < 4 {
        return Err(TrackError::RouteData(format!(
            "payload på {} byte mangler punkttelling",
            bytes.len()
        )));
    }

    let mut hdr = [0u8; 4];
    hdr.copy_from_slice(&bytes[..4]);
    let count = u32::from_be_bytes(hdr) as usize;

    let expected = 4 + count * 16;
    if bytes.len() != expected {
        return Err(TrackError::RouteData(format!(
            "ventet {expected} byte for {count} punkter, fikk {}",
            bytes.len()
        )));
    }

    let mut points = Vec::with_capacity(count);
    let mut off = 4;
    let mut word = [0u8; 8];
    for _ in 0..count {
        word.copy_from_slice(&bytes[off..off + 8]);
        let lat = f64::from_be_bytes(word);
        word.copy_from_slice(&bytes[off + 8..off + 16]);
        let lon = f64::from_be_bytes(word);
        points.push(GeoPoint { lat, lon });
        off += 16;
    }
    Ok(points)
}
