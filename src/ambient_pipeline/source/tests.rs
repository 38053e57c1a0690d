use std::time::Duration;

use crate::ambient_pipeline::{
    analysis::AnalyzeSettings,
    source::{AccessTicket, Crop, Frame, GrabRequest, UnrestrictedTicket},
};

#[test]
fn test_grab_request_geometry() {
    let settings = AnalyzeSettings { analyze_size: 1, overscan: 30, ..Default::default() };
    let request = GrabRequest::for_display(1920, 1080, &settings).unwrap();

    assert_eq!(request.width, 128);
    assert_eq!(request.height, 72);
    assert_eq!(request.crop, Crop { left: 57, right: 57, top: 32, bottom: 32 });
    assert_eq!(request.timeout, Duration::from_millis(100));
}

#[test]
fn test_grab_request_without_overscan() {
    let settings = AnalyzeSettings { analyze_size: 3, overscan: 0, ..Default::default() };
    let request = GrabRequest::for_display(720, 576, &settings).unwrap();

    assert_eq!(request.width, 256);
    assert_eq!(request.height, 204);
    assert_eq!(request.crop, Crop::default());
}

#[test]
fn test_grab_request_needs_display() {
    assert!(GrabRequest::for_display(0, 1080, &AnalyzeSettings::default()).is_none());
}

#[test]
fn test_request_rejects_mismatched_frame() {
    let request = GrabRequest::for_display(1920, 1080, &AnalyzeSettings::default()).unwrap();
    assert!(request.accepts(&Frame::new(128, 72, vec![0; 128 * 72 * 3])));
    assert!(!request.accepts(&Frame::new(128, 71, vec![0; 128 * 71 * 3])));
    assert!(!request.accepts(&Frame::new(128, 72, vec![0; 10])));
}

#[test]
fn test_unrestricted_ticket_is_never_revoked() {
    let ticket = UnrestrictedTicket;
    ticket.acquire();
    assert!(!ticket.is_revoked());
    ticket.renew();
    ticket.release();
}
