#![allow(dead_code)]

use formwire::{Part, PartSink};

pub const BOUNDARY: &str = "AaB03x";

pub const FIXTURE: &[u8] = b"--AaB03x\r\n\
content-disposition: form-data; name=\"field1\"\r\n\
\r\n\
Joe Blow\r\nalmost tricked you!\r\n\
--AaB03x\r\n\
content-disposition: form-data; name=\"pics\"; filename=\"file1.txt\"\r\n\
Content-Type: text/plain\r\n\
\r\n\
... contents of file1.txt ...\r\r\n\
--AaB03x--\r\n";

pub const FIELD1: &[u8] = b"Joe Blow\r\nalmost tricked you!";
pub const PICS: &[u8] = b"... contents of file1.txt ...\r";

/// Records every part callback in order.
#[derive(Debug, Default)]
pub struct Recording {
    pub parts: Vec<(Part, Vec<u8>)>,
    pub log: Vec<String>,
}

impl PartSink for Recording {
    fn on_part(&mut self, part: &Part) {
        self.log.push(format!("part:{}", part.name));
        self.parts.push((part.clone(), Vec::new()));
    }

    fn on_data(&mut self, part: &Part, data: &[u8]) {
        let (open, body) = self.parts.last_mut().expect("data before part");
        assert_eq!(open.name, part.name);
        body.extend_from_slice(data);
    }

    fn on_part_end(&mut self, part: &Part) {
        assert!(part.ended);
        self.log.push(format!("end:{}", part.name));
    }
}

pub fn chunks_of(input: &[u8], size: usize) -> Vec<&[u8]> {
    input.chunks(size).collect()
}
